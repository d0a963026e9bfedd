use super::state::AppState;
use crate::agent::AgentSnapshot;
use crate::control::DispatchOutcome;
use crate::error::ClientError;
use crate::protocol::{Command, InterruptPriority};
use crate::session::SessionState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: Command,

    /// Defaults to no interruption
    #[serde(default)]
    pub interrupt_priority: InterruptPriority,

    pub message: Option<String>,
}

/// Changes applied by /session/update; absent fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRequest {
    pub welcome_message: Option<String>,

    /// Replaces the LLM/TTS/ASR settings document
    pub config: Option<Value>,
}

impl UpdateRequest {
    pub fn apply(self, current: &AgentSnapshot) -> AgentSnapshot {
        let mut snapshot = current.clone();
        if let Some(welcome_message) = self.welcome_message {
            snapshot.agent_config.welcome_message = welcome_message;
        }
        if let Some(config) = self.config {
            snapshot.config = config;
        }
        snapshot
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub status: String,
    pub message: String,
    pub session: SessionState,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: String,
    pub interrupting: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: ClientError) -> Response {
    let status = match &err {
        ClientError::AgentStartFailed(_) | ClientError::AgentStopFailed(_) => {
            StatusCode::BAD_GATEWAY
        }
        ClientError::TransitionInProgress | ClientError::CommandRejected => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!("Request failed: {}", err);

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn session_response(status: &str, message: &str, session: SessionState) -> Response {
    (
        StatusCode::OK,
        Json(SessionResponse {
            status: status.to_string(),
            message: message.to_string(),
            session,
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start the agent, restarting it if already running
pub async fn start_session(State(state): State<AppState>) -> Response {
    info!("Starting agent session");

    let snapshot = state.snapshot.read().await.clone();

    match state.client.start_agent(snapshot).await {
        Ok(session) => session_response("active", "Agent started", session),
        Err(e) => error_response(e),
    }
}

/// POST /session/update
/// Restart the agent with changed settings
///
/// The body is optional; without one the current configuration is reapplied.
/// The new configuration is kept for later starts once the agent accepts it.
pub async fn update_session(State(state): State<AppState>, body: Bytes) -> Response {
    let changes: UpdateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        UpdateRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(changes) => changes,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Invalid update body: {}", e),
                    }),
                )
                    .into_response()
            }
        }
    };

    info!("Updating agent session");

    let snapshot = changes.apply(&*state.snapshot.read().await);

    match state.client.update_agent(snapshot.clone()).await {
        Ok(session) => {
            *state.snapshot.write().await = snapshot;
            session_response("active", "Agent restarted", session)
        }
        Err(e) => error_response(e),
    }
}

/// POST /session/stop
/// Stop the agent; succeeds when nothing is running
pub async fn stop_session(State(state): State<AppState>) -> Response {
    info!("Stopping agent session");

    match state.client.stop_agent().await {
        Ok(session) => session_response("idle", "Agent stopped", session),
        Err(e) => error_response(e),
    }
}

/// POST /session/command
/// Send a control command to the agent
pub async fn send_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Response {
    let outcome = state
        .client
        .send_command(req.command, req.interrupt_priority, req.message.as_deref())
        .await;

    match outcome {
        Ok(DispatchOutcome::Sent { interrupting }) => (
            StatusCode::OK,
            Json(CommandResponse {
                status: "sent".to_string(),
                interrupting,
            }),
        )
            .into_response(),
        Ok(DispatchOutcome::Rejected) => error_response(ClientError::CommandRejected),
        Err(e) => error_response(e),
    }
}

/// GET /session/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.client.state().await))
}

/// GET /session/transcript
/// Get the conversation so far
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.client.transcript().await))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
