use serde::{Deserialize, Serialize};

/// Command understood by the remote agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Stop the agent's current turn
    #[serde(rename = "interrupt")]
    Interrupt,
    /// Have the agent speak the given text verbatim
    #[serde(rename = "ExternalTextToSpeech")]
    ExternalTextToSpeech,
    /// Feed the given text to the agent's LLM as if the user said it
    #[serde(rename = "ExternalTextToLLM")]
    ExternalTextToLlm,
}

/// How hard a command should cut into what the agent is doing
///
/// The ordering is interpreted by the agent; the client only encodes it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum InterruptPriority {
    #[default]
    None,
    High,
    Medium,
    Low,
}

impl From<InterruptPriority> for u8 {
    fn from(priority: InterruptPriority) -> Self {
        match priority {
            InterruptPriority::None => 0,
            InterruptPriority::High => 1,
            InterruptPriority::Medium => 2,
            InterruptPriority::Low => 3,
        }
    }
}

impl TryFrom<u8> for InterruptPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(format!("unknown interrupt priority {}", other)),
        }
    }
}

/// Control message sent to the agent under the `ctrl` tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "Command")]
    pub command: Command,
    #[serde(rename = "InterruptMode")]
    pub interrupt_priority: InterruptPriority,
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl ControlMessage {
    pub fn new(command: Command, interrupt_priority: InterruptPriority, message: Option<&str>) -> Self {
        Self {
            command,
            interrupt_priority,
            message: message.unwrap_or_default().to_string(),
        }
    }

    /// Whether sending this message cuts off the agent's current turn
    pub fn is_interrupting(&self) -> bool {
        self.command == Command::Interrupt || self.interrupt_priority == InterruptPriority::High
    }
}

/// One subtitle update from the `subv` channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFragment {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub definite: bool,
    #[serde(default)]
    pub paragraph: bool,
}

/// Body of a `subv` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleMessage {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Vec<SubtitleFragment>,
}

/// Agent conversation stage, as reported by `conv` briefs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStage {
    Unknown,
    Listening,
    Thinking,
    Speaking,
    Interrupted,
    Finished,
}

impl AgentStage {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Listening,
            2 => Self::Thinking,
            3 => Self::Speaking,
            4 => Self::Interrupted,
            5 => Self::Finished,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stage {
    #[serde(rename = "Code", default)]
    pub code: i64,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// Body of a `conv` frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateBrief {
    #[serde(rename = "Stage", default)]
    pub stage: Stage,
}

impl StateBrief {
    pub fn agent_stage(&self) -> AgentStage {
        AgentStage::from_code(self.stage.code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionSpec,
}

/// Body of an inbound `func` frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Body of an outbound `func` frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    #[serde(rename = "ToolCallID")]
    pub tool_call_id: String,
    #[serde(rename = "Content")]
    pub content: String,
}

/// An inbound frame classified by its tag
#[derive(Debug, Clone)]
pub enum InboundEnvelope {
    StateBrief(StateBrief),
    Subtitle(Vec<SubtitleFragment>),
    FunctionCall(FunctionCallRequest),
    Unrecognized { tag: String },
}
