use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::agent::{AgentApi, AgentSnapshot};
use crate::control::{CommandDispatcher, DispatchOutcome};
use crate::error::ClientResult;
use crate::protocol::{Command, InterruptPriority};
use crate::router::{MessageRouter, RouteOutcome};
use crate::session::{SessionManager, SessionMarker, SessionState};
use crate::sink::UiSink;
use crate::transcript::{Participants, TranscriptReconciler, Utterance};
use crate::transport::Transport;

/// Who is who in the room
#[derive(Debug, Clone)]
pub struct RoomIdentity {
    pub room_id: String,
    /// Local user id
    pub user_id: String,
    /// Reserved room identity of the agent
    pub agent_id: String,
}

/// Voice chat client: session lifecycle, commands and inbound routing
///
/// Collaborators are injected so tests can run against fakes.
pub struct VoiceChatClient {
    session: Arc<SessionManager>,
    dispatcher: CommandDispatcher,
    router: Arc<MessageRouter>,
    transcript: Arc<Mutex<TranscriptReconciler>>,
    sink: Arc<dyn UiSink>,

    /// Handle for the inbound frame task
    pump_handle: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceChatClient {
    pub fn new(
        identity: RoomIdentity,
        transport: Arc<dyn Transport>,
        agent_api: Arc<dyn AgentApi>,
        sink: Arc<dyn UiSink>,
        marker: SessionMarker,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            identity.room_id.clone(),
            identity.user_id.clone(),
            Arc::clone(&transport),
            agent_api,
            marker,
        ));

        let dispatcher = CommandDispatcher::new(
            Arc::clone(&transport),
            identity.agent_id.clone(),
            session.enabled_flag(),
        );

        let transcript = Arc::new(Mutex::new(TranscriptReconciler::new(Participants::new(
            identity.user_id.clone(),
            identity.agent_id.clone(),
        ))));

        let router = Arc::new(MessageRouter::new(
            transport,
            identity.agent_id,
            Arc::clone(&transcript),
            Arc::clone(&sink),
        ));

        Self {
            session,
            dispatcher,
            router,
            transcript,
            sink,
            pump_handle: Mutex::new(None),
        }
    }

    /// Join the room and start routing inbound frames
    pub async fn join_room(&self) -> ClientResult<()> {
        let mut inbound = self.session.join_room().await?;
        let router = Arc::clone(&self.router);

        let task = tokio::spawn(async move {
            info!("Inbound routing task started");

            while let Some(frame) = inbound.recv().await {
                router.on_inbound_bytes(&frame.payload).await;
            }

            info!("Inbound routing task stopped");
        });

        let mut handle = self.pump_handle.lock().await;
        if let Some(previous) = handle.replace(task) {
            warn!("Room joined twice, replacing inbound routing task");
            previous.abort();
        }

        Ok(())
    }

    /// Stop the agent and leave the room
    pub async fn leave_room(&self) -> ClientResult<()> {
        let result = self.session.leave_room().await;

        let mut handle = self.pump_handle.lock().await;
        if let Some(task) = handle.take() {
            task.abort();
        }

        result
    }

    pub async fn start_agent(&self, snapshot: AgentSnapshot) -> ClientResult<SessionState> {
        self.session.start(snapshot).await
    }

    pub async fn update_agent(&self, snapshot: AgentSnapshot) -> ClientResult<SessionState> {
        self.session.update(snapshot).await
    }

    pub async fn stop_agent(&self) -> ClientResult<SessionState> {
        self.session.stop().await
    }

    /// Send a command to the agent
    ///
    /// An interrupting command also seals the agent's open utterance in the
    /// transcript and flags it interrupted.
    pub async fn send_command(
        &self,
        command: Command,
        priority: InterruptPriority,
        message: Option<&str>,
    ) -> ClientResult<DispatchOutcome> {
        let outcome = self
            .dispatcher
            .send_command(command, priority, message)
            .await?;

        if outcome == (DispatchOutcome::Sent { interrupting: true }) {
            let mut transcript = self.transcript.lock().await;
            if transcript.interrupt() {
                if let Some(latest) = transcript.utterances().last() {
                    self.sink.transcript_updated(latest);
                }
                self.sink.speaking_changed(transcript.speaking_state());
            }
        }

        Ok(outcome)
    }

    /// Route one inbound frame directly, bypassing the transport
    pub async fn on_inbound_bytes(&self, bytes: &[u8]) -> RouteOutcome {
        self.router.on_inbound_bytes(bytes).await
    }

    pub async fn state(&self) -> SessionState {
        self.session.state().await
    }

    pub fn is_enabled(&self) -> bool {
        self.session.is_enabled()
    }

    /// Read-only copy of the transcript
    pub async fn transcript(&self) -> Vec<Utterance> {
        self.transcript.lock().await.utterances().to_vec()
    }
}
