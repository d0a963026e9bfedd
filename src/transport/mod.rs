//! Real-time room transport
//!
//! The media engine is opaque to this crate; all we need from it is a way to
//! send byte buffers to a named participant and a stream of buffers sent to
//! us. Only the session lifecycle manager joins or leaves the room.

mod nats;

pub use nats::NatsTransport;

use anyhow::Result;
use bytes::Bytes;
use tokio::sync::mpsc;

/// A binary message delivered to the local participant
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// Participant that sent the message
    pub from: String,
    /// Raw TLV bytes
    pub payload: Bytes,
}

/// Bidirectional byte channel to the participants of one room
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Join the room
    ///
    /// Returns a channel receiver that will receive inbound frames in delivery order
    async fn join(&self) -> Result<mpsc::Receiver<InboundFrame>>;

    /// Leave the room; safe to call when not joined
    async fn leave(&self) -> Result<()>;

    /// Send a binary message to one participant
    async fn send(&self, peer_id: &str, payload: Bytes) -> Result<()>;

    /// Transport name for logging
    fn name(&self) -> &str;
}
