use anyhow::{bail, Context, Result};
use async_nats::Client;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{InboundFrame, Transport};

/// Room transport backed by NATS subjects
///
/// A frame from `from` to `to` in `room` travels on `rtc.<room>.<to>.<from>`,
/// so each participant only subscribes to `rtc.<room>.<self>.*`.
pub struct NatsTransport {
    client: Client,
    room_id: String,
    user_id: String,
    /// Handle for the subscription forwarding task
    forward_task: Mutex<Option<JoinHandle<()>>>,
}

impl NatsTransport {
    /// Connect to NATS server
    pub async fn connect(url: &str, room_id: String, user_id: String) -> Result<Self> {
        check_subject_token(&room_id).context("Invalid room id")?;
        check_subject_token(&user_id).context("Invalid user id")?;

        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            room_id,
            user_id,
            forward_task: Mutex::new(None),
        })
    }

    fn subject(&self, to: &str) -> String {
        format!("rtc.{}.{}.{}", self.room_id, to, self.user_id)
    }
}

/// Ids become single subject tokens, so separators and wildcards are refused
fn check_subject_token(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("id is empty");
    }
    if let Some(c) = id
        .chars()
        .find(|c| matches!(c, '.' | '*' | '>') || c.is_whitespace())
    {
        bail!("{:?} contains {:?}, not allowed in a NATS subject token", id, c);
    }
    Ok(())
}

#[async_trait::async_trait]
impl Transport for NatsTransport {
    async fn join(&self) -> Result<mpsc::Receiver<InboundFrame>> {
        let subject = format!("rtc.{}.{}.*", self.room_id, self.user_id);

        info!("Joining room {} on {}", self.room_id, subject);

        let mut subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to room subject")?;

        let (tx, rx) = mpsc::channel(256);

        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let from = msg
                    .subject
                    .as_str()
                    .rsplit('.')
                    .next()
                    .unwrap_or_default()
                    .to_string();

                let frame = InboundFrame {
                    from,
                    payload: msg.payload,
                };

                if tx.send(frame).await.is_err() {
                    debug!("Inbound receiver dropped, stopping forwarder");
                    break;
                }
            }

            info!("Room subscription closed");
        });

        let mut handle = self.forward_task.lock().await;
        if let Some(previous) = handle.replace(task) {
            warn!("Joined room twice, dropping previous subscription");
            previous.abort();
        }

        Ok(rx)
    }

    async fn leave(&self) -> Result<()> {
        let mut handle = self.forward_task.lock().await;
        if let Some(task) = handle.take() {
            info!("Leaving room {}", self.room_id);
            task.abort();
        }
        Ok(())
    }

    async fn send(&self, peer_id: &str, payload: Bytes) -> Result<()> {
        check_subject_token(peer_id).context("Invalid peer id")?;

        let subject = self.subject(peer_id);
        let len = payload.len();

        self.client
            .publish(subject.clone(), payload)
            .await
            .context("Failed to publish room message")?;

        debug!("Published {} bytes to {}", len, subject);

        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_accepted() {
        assert!(check_subject_token("Room123").is_ok());
        assert!(check_subject_token("voiceChat_RobotMan_").is_ok());
        assert!(check_subject_token("user-3f2a").is_ok());
    }

    #[test]
    fn test_subject_breaking_ids_rejected() {
        for id in ["", "room.1", "room*", "room>", "my room", "tab\there"] {
            assert!(check_subject_token(id).is_err(), "{:?}", id);
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_room_before_dialing() {
        // Nothing listens here; validation must fail first
        let err = NatsTransport::connect("nats://127.0.0.1:1", "a.b".into(), "User123".into())
            .await
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("Invalid room id"));
    }
}
