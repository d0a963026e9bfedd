use super::marker::{SessionMarker, SessionRecord};
use super::state::{EnabledFlag, LifecyclePhase, SessionState};
use crate::agent::{AgentApi, AgentSnapshot, StopVoiceChatRequest};
use crate::error::{ClientError, ClientResult};
use crate::transport::{InboundFrame, Transport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

#[derive(Default)]
struct Lifecycle {
    phase: LifecyclePhase,
    started_at: Option<DateTime<Utc>>,
    /// Configuration of the running agent
    active: Option<AgentSnapshot>,
}

/// Owns the remote agent lifecycle and the room transport lifecycle
///
/// Only one start/stop transition runs at a time; a second one issued while
/// the first is in flight fails with `TransitionInProgress`.
pub struct SessionManager {
    room_id: String,
    user_id: String,

    transport: Arc<dyn Transport>,
    agent_api: Arc<dyn AgentApi>,
    marker: SessionMarker,

    /// Shared with the command dispatcher
    enabled: EnabledFlag,

    lifecycle: Mutex<Lifecycle>,

    /// Single-slot guard for start/stop transitions
    transition: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        room_id: String,
        user_id: String,
        transport: Arc<dyn Transport>,
        agent_api: Arc<dyn AgentApi>,
        marker: SessionMarker,
    ) -> Self {
        if marker.is_present() {
            warn!(
                "Found session marker at {}, a previous agent may still be running",
                marker.path().display()
            );
        }

        Self {
            room_id,
            user_id,
            transport,
            agent_api,
            marker,
            enabled: EnabledFlag::new(),
            lifecycle: Mutex::new(Lifecycle::default()),
            transition: Mutex::new(()),
        }
    }

    pub fn enabled_flag(&self) -> EnabledFlag {
        self.enabled.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    /// Get current session state
    pub async fn state(&self) -> SessionState {
        let lifecycle = self.lifecycle.lock().await;

        SessionState {
            enabled: self.enabled.is_enabled(),
            phase: lifecycle.phase,
            started_at: lifecycle.started_at,
            room_id: self.room_id.clone(),
            user_id: self.user_id.clone(),
        }
    }

    async fn set_phase(&self, phase: LifecyclePhase) {
        self.lifecycle.lock().await.phase = phase;
    }

    /// Join the room and start receiving inbound frames
    pub async fn join_room(&self) -> ClientResult<mpsc::Receiver<InboundFrame>> {
        info!(
            "Joining room {} as {} via {}",
            self.room_id,
            self.user_id,
            self.transport.name()
        );

        self.transport
            .join()
            .await
            .map_err(|e| ClientError::Transport(format!("{:#}", e)))
    }

    /// Stop the agent, then leave the room
    ///
    /// Waits for an in-flight start or stop to finish rather than failing, so
    /// no agent is left running in a room we have left. The room is left even
    /// when stopping the agent fails; the stop error is still reported.
    pub async fn leave_room(&self) -> ClientResult<()> {
        info!("Leaving room {}", self.room_id);

        let stopped = {
            let _guard = self.transition.lock().await;
            self.stop_locked().await
        };

        if let Err(e) = self.transport.leave().await {
            error!("Failed to leave room: {:#}", e);
            return Err(ClientError::Transport(format!("{:#}", e)));
        }

        stopped
    }

    /// Start the agent with `snapshot`
    ///
    /// A running agent is stopped first, so the remote side always reflects
    /// the latest configuration.
    pub async fn start(&self, snapshot: AgentSnapshot) -> ClientResult<SessionState> {
        let _guard = self
            .transition
            .try_lock()
            .map_err(|_| ClientError::TransitionInProgress)?;

        self.stop_locked().await?;

        info!(
            "Starting agent for room {} (task {})",
            snapshot.room_id, snapshot.task_id
        );
        self.set_phase(LifecyclePhase::Starting).await;

        if let Err(e) = self.agent_api.start(&snapshot.start_request()).await {
            error!("Failed to start agent: {}", e);
            self.set_phase(LifecyclePhase::Idle).await;
            return Err(ClientError::AgentStartFailed(e));
        }

        let started_at = Utc::now();
        let record = SessionRecord {
            app_id: snapshot.app_id.clone(),
            business_id: snapshot.business_id.clone(),
            room_id: snapshot.room_id.clone(),
            task_id: snapshot.task_id.clone(),
            started_at,
        };
        if let Err(e) = self.marker.save(&record) {
            warn!("Agent started but marker was not persisted: {:#}", e);
        }

        {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.phase = LifecyclePhase::Active;
            lifecycle.started_at = Some(started_at);
            lifecycle.active = Some(snapshot);
        }
        self.enabled.set(true);

        info!("Agent started successfully");

        Ok(self.state().await)
    }

    /// Reconfigure the agent
    ///
    /// The control API has no partial update, so this is a full stop-then-start.
    pub async fn update(&self, snapshot: AgentSnapshot) -> ClientResult<SessionState> {
        info!("Updating agent configuration");
        self.start(snapshot).await
    }

    /// Stop the agent
    ///
    /// Safe to call when idle. A remote stop is issued only for a running
    /// agent or a surviving session marker.
    pub async fn stop(&self) -> ClientResult<SessionState> {
        let _guard = self
            .transition
            .try_lock()
            .map_err(|_| ClientError::TransitionInProgress)?;

        self.stop_locked().await?;

        Ok(self.state().await)
    }

    async fn stop_locked(&self) -> ClientResult<()> {
        let request: Option<StopVoiceChatRequest> = {
            let lifecycle = self.lifecycle.lock().await;
            match &lifecycle.active {
                Some(snapshot) => Some(snapshot.stop_request()),
                None => self.marker.load().map(|record| record.stop_request()),
            }
        };

        let Some(request) = request else {
            self.enabled.set(false);
            self.set_phase(LifecyclePhase::Idle).await;
            return Ok(());
        };

        info!(
            "Stopping agent for room {} (task {})",
            request.room_id, request.task_id
        );

        self.enabled.set(false);
        self.set_phase(LifecyclePhase::Stopping).await;

        let result = self.agent_api.stop(&request).await;

        {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.phase = LifecyclePhase::Idle;
            lifecycle.started_at = None;
            lifecycle.active = None;
        }

        match result {
            Ok(()) => {
                self.marker.clear();
                info!("Agent stopped successfully");
                Ok(())
            }
            Err(e) => {
                // Marker stays so the next stop retries the remote call
                error!("Failed to stop agent: {}", e);
                Err(ClientError::AgentStopFailed(e))
            }
        }
    }
}
