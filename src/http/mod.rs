//! HTTP API server for local control of the voice chat session
//!
//! This module provides a REST API around `VoiceChatClient`:
//! - POST /session/start - Start the agent (restarts a running one)
//! - POST /session/update - Reconfigure the agent
//! - POST /session/stop - Stop the agent
//! - POST /session/command - Send a control command
//! - GET /session/status - Query session state
//! - GET /session/transcript - Get the transcript so far
//! - GET /session/events - WebSocket stream of UI events
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use handlers::{CommandRequest, UpdateRequest};
pub use routes::create_router;
pub use state::AppState;
