use crate::agent::AgentSnapshot;
use crate::client::VoiceChatClient;
use crate::sink::BroadcastSink;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The client driving the agent
    pub client: Arc<VoiceChatClient>,

    /// Configuration used for start; replaced by a successful update
    pub snapshot: Arc<RwLock<AgentSnapshot>>,

    /// UI events streamed to WebSocket subscribers
    pub events: Arc<BroadcastSink>,
}

impl AppState {
    pub fn new(
        client: Arc<VoiceChatClient>,
        snapshot: AgentSnapshot,
        events: Arc<BroadcastSink>,
    ) -> Self {
        Self {
            client,
            snapshot: Arc::new(RwLock::new(snapshot)),
            events,
        }
    }
}
