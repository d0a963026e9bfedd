use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where the agent lifecycle currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Snapshot of the agent session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Whether commands may be sent to the agent
    pub enabled: bool,

    pub phase: LifecyclePhase,

    /// When the agent was last started successfully
    pub started_at: Option<DateTime<Utc>>,

    pub room_id: String,

    pub user_id: String,
}

/// Shared "agent is enabled" flag
///
/// Written by the lifecycle manager, read by the command dispatcher.
#[derive(Debug, Clone, Default)]
pub struct EnabledFlag(Arc<AtomicBool>);

impl EnabledFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}
