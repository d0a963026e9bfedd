//! Agent lifecycle API
//!
//! The agent itself runs server-side; this module only knows how to ask the
//! control surface to start or stop it for a room.

mod api;
mod request;

pub use api::{AgentApi, AgentApiError, HttpAgentApi};
pub use request::{
    AgentConfig, AgentSnapshot, ApiResponse, StartVoiceChatRequest, StopVoiceChatRequest,
};
