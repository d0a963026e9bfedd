use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix the agent service uses for agent room identities
pub const AGENT_ID_PREFIX: &str = "voiceChat_";

/// Who an utterance belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    /// The local user
    User,
    /// The remote agent
    Agent,
    /// Any other room participant
    Other,
}

/// Maps room identities to roles
#[derive(Debug, Clone)]
pub struct Participants {
    pub user_id: String,
    pub agent_id: String,
}

impl Participants {
    pub fn new(user_id: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            agent_id: agent_id.into(),
        }
    }

    pub fn role_of(&self, speaker: &str) -> SpeakerRole {
        if speaker == self.user_id {
            SpeakerRole::User
        } else if speaker == self.agent_id || speaker.starts_with(AGENT_ID_PREFIX) {
            SpeakerRole::Agent
        } else {
            SpeakerRole::Other
        }
    }
}

/// One continuous turn by a single speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub role: SpeakerRole,
    pub text: String,
    pub is_final: bool,
    pub is_interrupted: bool,
    pub started_at: DateTime<Utc>,
}

impl Utterance {
    pub(crate) fn open(speaker: &str, role: SpeakerRole, text: &str) -> Self {
        Self {
            speaker: speaker.to_string(),
            role,
            text: text.to_string(),
            is_final: false,
            is_interrupted: false,
            started_at: Utc::now(),
        }
    }
}

/// Who is currently mid-utterance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakingState {
    pub agent_talking: bool,
    pub user_talking: bool,
}
