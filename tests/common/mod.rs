// Shared fakes for integration tests
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use voicechat_client::agent::{
    AgentApi, AgentApiError, AgentConfig, AgentSnapshot, StartVoiceChatRequest,
    StopVoiceChatRequest,
};
use voicechat_client::protocol::tlv;
use voicechat_client::{
    BroadcastSink, InboundFrame, RoomIdentity, SessionMarker, Transport, VoiceChatClient,
};

pub const ROOM: &str = "Room123";
pub const USER: &str = "User123";
pub const AGENT: &str = "RobotMan_";

/// In-memory transport that records every send
#[derive(Default)]
pub struct FakeTransport {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    inbound: Mutex<Option<mpsc::Sender<InboundFrame>>>,
    pub joins: AtomicUsize,
    pub leaves: AtomicUsize,
    pub fail_send: AtomicBool,
}

impl FakeTransport {
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Push a frame as if `from` had sent it to us
    pub async fn deliver(&self, from: &str, payload: Vec<u8>) {
        let tx = self.inbound.lock().unwrap().clone();
        if let Some(tx) = tx {
            tx.send(InboundFrame {
                from: from.to_string(),
                payload: Bytes::from(payload),
            })
            .await
            .unwrap();
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn join(&self) -> Result<mpsc::Receiver<InboundFrame>> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(64);
        *self.inbound.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn leave(&self) -> Result<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        self.inbound.lock().unwrap().take();
        Ok(())
    }

    async fn send(&self, peer_id: &str, payload: Bytes) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(anyhow!("link down"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((peer_id.to_string(), payload.to_vec()));
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Agent API that counts calls and can be told to fail
#[derive(Default)]
pub struct FakeAgentApi {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    pub start_delay: Mutex<Option<Duration>>,
    pub last_start: Mutex<Option<StartVoiceChatRequest>>,
    pub last_stop: Mutex<Option<StopVoiceChatRequest>>,
}

impl FakeAgentApi {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AgentApi for FakeAgentApi {
    async fn start(&self, request: &StartVoiceChatRequest) -> Result<(), AgentApiError> {
        let delay = *self.start_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.last_start.lock().unwrap() = Some(request.clone());
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(AgentApiError::Remote {
                code: "InvalidParameter".to_string(),
                message: "bad room".to_string(),
            });
        }
        Ok(())
    }

    async fn stop(&self, request: &StopVoiceChatRequest) -> Result<(), AgentApiError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        *self.last_stop.lock().unwrap() = Some(request.clone());
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(AgentApiError::Status(503));
        }
        Ok(())
    }
}

pub fn identity() -> RoomIdentity {
    RoomIdentity {
        room_id: ROOM.to_string(),
        user_id: USER.to_string(),
        agent_id: AGENT.to_string(),
    }
}

pub fn snapshot() -> AgentSnapshot {
    AgentSnapshot {
        app_id: "app".to_string(),
        business_id: None,
        room_id: ROOM.to_string(),
        task_id: USER.to_string(),
        agent_config: AgentConfig {
            user_id: AGENT.to_string(),
            target_user_id: vec![USER.to_string()],
            welcome_message: "Hello".to_string(),
            enable_conversation_state_callback: true,
            server_message_signature_for_rts: "conversation".to_string(),
        },
        config: serde_json::json!({}),
    }
}

pub struct Harness {
    pub client: Arc<VoiceChatClient>,
    pub transport: Arc<FakeTransport>,
    pub api: Arc<FakeAgentApi>,
    pub sink: Arc<BroadcastSink>,
    pub marker: SessionMarker,
    pub dir: TempDir,
}

pub fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    harness_in(dir)
}

/// Build a client whose marker lives in `dir`
pub fn harness_in(dir: TempDir) -> Harness {
    let transport = Arc::new(FakeTransport::default());
    let api = Arc::new(FakeAgentApi::default());
    let sink = Arc::new(BroadcastSink::default());
    let marker = SessionMarker::new(dir.path().join("session.json"));

    let client = Arc::new(VoiceChatClient::new(
        identity(),
        transport.clone(),
        api.clone(),
        sink.clone(),
        marker.clone(),
    ));

    Harness {
        client,
        transport,
        api,
        sink,
        marker,
        dir,
    }
}

pub fn subtitle_frame(user: &str, text: &str, definite: bool, paragraph: bool) -> Vec<u8> {
    let body = serde_json::json!({
        "type": "subtitle",
        "data": [{
            "text": text,
            "userId": user,
            "definite": definite,
            "paragraph": paragraph,
        }]
    });
    tlv::encode(tlv::TAG_SUBTITLE, &body.to_string()).unwrap()
}
