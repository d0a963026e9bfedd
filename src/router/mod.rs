//! Inbound message classification and routing
//!
//! Frames from the agent are decoded, classified by tag and handed to the
//! matching handler:
//! - `conv` state briefs go to logging and the UI stage indicator
//! - `subv` subtitle fragments go to the transcript reconciler
//! - `func` tool calls are answered from a fixed table
//!
//! Nothing here returns an error: a malformed frame is logged and dropped so
//! the conversation keeps going.

mod tools;

pub use tools::ToolKind;

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::protocol::tlv::{self, TAG_FUNCTION_CALL};
use crate::protocol::{
    self, AgentStage, FunctionCallRequest, InboundEnvelope, StateBrief, SubtitleFragment,
    ToolCallResponse,
};
use crate::sink::UiSink;
use crate::transcript::TranscriptReconciler;
use crate::transport::Transport;

/// What happened to an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// State brief logged and forwarded
    Brief(AgentStage),
    /// Subtitle fragments applied to the transcript
    Subtitle { applied: usize },
    /// Tool call handled; `replied` is false for unknown tools
    ToolCall { replied: bool },
    /// Tag this client does not understand
    Unrecognized,
    /// Malformed frame or body
    Dropped,
}

pub struct MessageRouter {
    transport: Arc<dyn Transport>,
    agent_id: String,
    transcript: Arc<Mutex<TranscriptReconciler>>,
    sink: Arc<dyn UiSink>,
}

impl MessageRouter {
    pub fn new(
        transport: Arc<dyn Transport>,
        agent_id: String,
        transcript: Arc<Mutex<TranscriptReconciler>>,
        sink: Arc<dyn UiSink>,
    ) -> Self {
        Self {
            transport,
            agent_id,
            transcript,
            sink,
        }
    }

    /// Decode, classify and handle one inbound frame
    pub async fn on_inbound_bytes(&self, bytes: &[u8]) -> RouteOutcome {
        let frame = match tlv::decode(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{}, dropping {} byte frame", ClientError::Decoding(e), bytes.len());
                return RouteOutcome::Dropped;
            }
        };

        let envelope = match protocol::classify(&frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to parse {} message: {}", frame.tag, e);
                return RouteOutcome::Dropped;
            }
        };

        match envelope {
            InboundEnvelope::StateBrief(brief) => self.on_brief(&brief),
            InboundEnvelope::Subtitle(fragments) => self.on_subtitle(&fragments).await,
            InboundEnvelope::FunctionCall(request) => self.on_function_call(&request).await,
            InboundEnvelope::Unrecognized { tag } => {
                debug!("Ignoring message with unknown tag {:?}", tag);
                RouteOutcome::Unrecognized
            }
        }
    }

    fn on_brief(&self, brief: &StateBrief) -> RouteOutcome {
        let stage = brief.agent_stage();

        info!(
            "Agent stage {} ({:?}): {}",
            brief.stage.code, stage, brief.stage.description
        );
        self.sink.stage_changed(stage, &brief.stage.description);

        RouteOutcome::Brief(stage)
    }

    async fn on_subtitle(&self, fragments: &[SubtitleFragment]) -> RouteOutcome {
        let mut transcript = self.transcript.lock().await;
        let mut applied = 0;

        for fragment in fragments {
            debug!(
                "Subtitle from {} (definite={}, paragraph={}): {}",
                fragment.user_id, fragment.definite, fragment.paragraph, fragment.text
            );

            let outcome = transcript.apply(fragment);
            if !outcome.changed {
                continue;
            }
            applied += 1;

            let utterances = transcript.utterances();
            if outcome.interrupted_agent && utterances.len() >= 2 {
                self.sink.transcript_updated(&utterances[utterances.len() - 2]);
            }
            if let Some(latest) = utterances.last() {
                self.sink.transcript_updated(latest);
            }
            if outcome.speaking_changed {
                self.sink.speaking_changed(transcript.speaking_state());
            }
        }

        RouteOutcome::Subtitle { applied }
    }

    async fn on_function_call(&self, request: &FunctionCallRequest) -> RouteOutcome {
        let Some(call) = request.tool_calls.first() else {
            warn!("Function call message without tool calls");
            return RouteOutcome::Dropped;
        };

        let Some(tool) = ToolKind::from_name(&call.function.name) else {
            warn!("{}", ClientError::UnknownToolCall(call.function.name.clone()));
            return RouteOutcome::ToolCall { replied: false };
        };

        info!("Tool call {} -> {:?}", call.id, tool);

        let response = ToolCallResponse {
            tool_call_id: call.id.clone(),
            content: tool.result().to_string(),
        };

        let frame = match serde_json::to_string(&response)
            .map_err(ClientError::from)
            .and_then(|json| tlv::encode(TAG_FUNCTION_CALL, &json).map_err(ClientError::Encoding))
        {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to build tool call response: {}", e);
                return RouteOutcome::ToolCall { replied: false };
            }
        };

        if let Err(e) = self.transport.send(&self.agent_id, Bytes::from(frame)).await {
            warn!("Failed to send tool call response: {:#}", e);
            return RouteOutcome::ToolCall { replied: false };
        }

        RouteOutcome::ToolCall { replied: true }
    }
}
