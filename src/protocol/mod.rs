//! Wire protocol for the room binary channel
//!
//! - `tlv`: tag-length-payload framing
//! - `messages`: JSON bodies carried inside frames

pub mod messages;
pub mod tlv;

pub use messages::{
    AgentStage, Command, ControlMessage, FunctionCallRequest, InboundEnvelope, InterruptPriority,
    StateBrief, SubtitleFragment, SubtitleMessage, ToolCall, ToolCallResponse,
};
pub use tlv::{TlvError, TlvFrame};

/// Classify a decoded frame by tag and parse its JSON body
pub fn classify(frame: &TlvFrame) -> Result<InboundEnvelope, serde_json::Error> {
    let envelope = match frame.tag.as_str() {
        tlv::TAG_BRIEF => InboundEnvelope::StateBrief(serde_json::from_str(&frame.payload)?),
        tlv::TAG_SUBTITLE => {
            let message: SubtitleMessage = serde_json::from_str(&frame.payload)?;
            InboundEnvelope::Subtitle(message.data)
        }
        tlv::TAG_FUNCTION_CALL => {
            InboundEnvelope::FunctionCall(serde_json::from_str(&frame.payload)?)
        }
        other => InboundEnvelope::Unrecognized {
            tag: other.to_string(),
        },
    };

    Ok(envelope)
}
