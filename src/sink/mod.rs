//! UI state sink
//!
//! Rendering lives outside this crate. Whatever draws the conversation gets
//! transcript updates, speaking-state transitions and agent stage briefs
//! through `UiSink`.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::protocol::AgentStage;
use crate::transcript::{SpeakerRole, SpeakingState, Utterance};

/// Receiver of display-facing state changes
pub trait UiSink: Send + Sync {
    /// An utterance was created or changed; `latest` is the one that moved
    fn transcript_updated(&self, latest: &Utterance);

    /// Agent or user started or stopped talking
    fn speaking_changed(&self, state: SpeakingState);

    /// Agent reported a new conversation stage
    fn stage_changed(&self, stage: AgentStage, description: &str);
}

/// Coarse status for visualizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Speaking,
    Listening,
    Thinking,
    Idle,
}

impl From<AgentStage> for Status {
    fn from(stage: AgentStage) -> Self {
        match stage {
            AgentStage::Speaking => Status::Speaking,
            AgentStage::Listening => Status::Listening,
            AgentStage::Thinking => Status::Thinking,
            AgentStage::Interrupted | AgentStage::Finished | AgentStage::Unknown => Status::Idle,
        }
    }
}

/// Event published to UI subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    UserMessage {
        text: String,
        user: String,
        definite: bool,
        is_interrupted: bool,
        timestamp: i64,
    },
    AiMessage {
        text: String,
        user: String,
        definite: bool,
        is_interrupted: bool,
        timestamp: i64,
    },
    SpeakingUpdate {
        agent_talking: bool,
        user_talking: bool,
    },
    StatusUpdate {
        status: Status,
        description: String,
    },
}

/// Fans UI events out over a tokio broadcast channel
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<UiEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: UiEvent) {
        // No subscribers is fine; the UI may not be attached yet
        if self.tx.send(event).is_err() {
            debug!("No UI subscribers, event dropped");
        }
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(256)
    }
}

impl UiSink for BroadcastSink {
    fn transcript_updated(&self, latest: &Utterance) {
        let text = latest.text.clone();
        let user = latest.speaker.clone();
        let definite = latest.is_final;
        let is_interrupted = latest.is_interrupted;
        let timestamp = latest.started_at.timestamp_millis();

        let event = match latest.role {
            SpeakerRole::User => UiEvent::UserMessage {
                text,
                user,
                definite,
                is_interrupted,
                timestamp,
            },
            SpeakerRole::Agent => UiEvent::AiMessage {
                text,
                user,
                definite,
                is_interrupted,
                timestamp,
            },
            SpeakerRole::Other => return,
        };

        self.publish(event);
    }

    fn speaking_changed(&self, state: SpeakingState) {
        self.publish(UiEvent::SpeakingUpdate {
            agent_talking: state.agent_talking,
            user_talking: state.user_talking,
        });
    }

    fn stage_changed(&self, stage: AgentStage, description: &str) {
        self.publish(UiEvent::StatusUpdate {
            status: stage.into(),
            description: description.to_string(),
        });
    }
}
