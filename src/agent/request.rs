use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agent-side settings sent with StartVoiceChat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentConfig {
    /// Room identity the agent joins as
    pub user_id: String,
    /// Users the agent listens and talks to
    pub target_user_id: Vec<String>,
    pub welcome_message: String,
    pub enable_conversation_state_callback: bool,
    #[serde(rename = "ServerMessageSignatureForRTS")]
    pub server_message_signature_for_rts: String,
}

/// Immutable configuration for one agent run
///
/// Built once from configuration and handed to `start`/`update`; nothing
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub app_id: String,
    pub business_id: Option<String>,
    pub room_id: String,
    pub task_id: String,
    pub agent_config: AgentConfig,
    /// LLM/TTS/ASR settings, forwarded untouched
    pub config: Value,
}

impl AgentSnapshot {
    pub fn start_request(&self) -> StartVoiceChatRequest {
        StartVoiceChatRequest {
            app_id: self.app_id.clone(),
            business_id: self.business_id.clone(),
            room_id: self.room_id.clone(),
            task_id: self.task_id.clone(),
            agent_config: self.agent_config.clone(),
            config: self.config.clone(),
        }
    }

    pub fn stop_request(&self) -> StopVoiceChatRequest {
        StopVoiceChatRequest {
            app_id: self.app_id.clone(),
            business_id: self.business_id.clone(),
            room_id: self.room_id.clone(),
            task_id: self.task_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartVoiceChatRequest {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub room_id: String,
    pub task_id: String,
    pub agent_config: AgentConfig,
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopVoiceChatRequest {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub room_id: String,
    pub task_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Envelope returned by the OpenAPI proxy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
    #[serde(default)]
    pub result: Option<Value>,
}

impl ApiResponse {
    /// Remote error code and message, if the call was refused
    pub fn error(&self) -> Option<(String, String)> {
        let error = self.response_metadata.error.as_ref()?;
        let code = error.code.clone().filter(|c| !c.is_empty())?;
        Some((code, error.message.clone().unwrap_or_default()))
    }
}
