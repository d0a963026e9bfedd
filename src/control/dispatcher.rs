use bytes::Bytes;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::protocol::tlv::{self, TAG_CONTROL};
use crate::protocol::{Command, ControlMessage, InterruptPriority};
use crate::session::EnabledFlag;
use crate::transport::Transport;

/// Result of a dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the transport
    Sent {
        /// The command cuts off the agent's current turn
        interrupting: bool,
    },
    /// Agent not enabled, nothing sent
    Rejected,
}

/// Builds control messages and sends them to the agent
///
/// Every call is one transport send; nothing is queued or coalesced.
pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    agent_id: String,
    enabled: EnabledFlag,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn Transport>, agent_id: String, enabled: EnabledFlag) -> Self {
        Self {
            transport,
            agent_id,
            enabled,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Send a command to the agent
    ///
    /// While the agent is not enabled this is a logged no-op, so a command
    /// racing a room leave cannot fail the caller.
    pub async fn send_command(
        &self,
        command: Command,
        priority: InterruptPriority,
        message: Option<&str>,
    ) -> ClientResult<DispatchOutcome> {
        if !self.enabled.is_enabled() {
            warn!("{}, dropping {:?}", ClientError::CommandRejected, command);
            return Ok(DispatchOutcome::Rejected);
        }

        let control = ControlMessage::new(command, priority, message);
        let json = serde_json::to_string(&control)?;
        let frame = tlv::encode(TAG_CONTROL, &json).map_err(ClientError::Encoding)?;

        self.transport
            .send(&self.agent_id, Bytes::from(frame))
            .await
            .map_err(|e| ClientError::Transport(format!("{:#}", e)))?;

        info!(
            "Sent {:?} (priority {:?}) to {}",
            command, priority, self.agent_id
        );

        Ok(DispatchOutcome::Sent {
            interrupting: control.is_interrupting(),
        })
    }
}
