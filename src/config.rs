use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::agent::{AgentConfig, AgentSnapshot};
use crate::client::RoomIdentity;

/// Signature the agent stamps on conversation-state messages
pub const CONVERSATION_SIGNATURE: &str = "conversation";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub rtc: RtcConfig,
    pub agent_api: AgentApiConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct RtcConfig {
    pub app_id: String,
    #[serde(default)]
    pub business_id: Option<String>,
    pub room_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    pub nats_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentApiConfig {
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub welcome_message: String,
    /// JSON file holding the LLM/TTS/ASR settings, forwarded as `Config`
    #[serde(default)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct StateConfig {
    pub marker_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            marker_path: PathBuf::from(".voicechat/session.json"),
        }
    }
}

fn default_bot_name() -> String {
    "RobotMan_".to_string()
}

fn default_api_version() -> String {
    "2024-12-01".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load from `path` (any format `config` understands), overlaid with
    /// `VOICECHAT__SECTION__KEY` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("VOICECHAT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Local user id, generated once per process when not configured
    pub fn identity(&self) -> RoomIdentity {
        let user_id = self
            .rtc
            .user_id
            .clone()
            .unwrap_or_else(|| format!("user-{}", uuid::Uuid::new_v4().simple()));

        RoomIdentity {
            room_id: self.rtc.room_id.clone(),
            user_id,
            agent_id: self.rtc.bot_name.clone(),
        }
    }

    /// Immutable agent configuration for one start/update
    pub fn snapshot(&self, identity: &RoomIdentity) -> Result<AgentSnapshot> {
        let config = match &self.agent.config_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid agent config in {}", path.display()))?
            }
            None => Value::Object(Default::default()),
        };

        Ok(AgentSnapshot {
            app_id: self.rtc.app_id.clone(),
            business_id: self.rtc.business_id.clone(),
            room_id: identity.room_id.clone(),
            task_id: identity.user_id.clone(),
            agent_config: AgentConfig {
                user_id: identity.agent_id.clone(),
                target_user_id: vec![identity.user_id.clone()],
                welcome_message: self.agent.welcome_message.clone(),
                enable_conversation_state_callback: true,
                server_message_signature_for_rts: CONVERSATION_SIGNATURE.to_string(),
            },
            config,
        })
    }
}
