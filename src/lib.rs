pub mod agent;
pub mod client;
pub mod config;
pub mod control;
pub mod error;
pub mod http;
pub mod protocol;
pub mod router;
pub mod session;
pub mod sink;
pub mod transcript;
pub mod transport;

pub use agent::{AgentApi, AgentApiError, AgentSnapshot, HttpAgentApi};
pub use client::{RoomIdentity, VoiceChatClient};
pub use config::Config;
pub use control::{CommandDispatcher, DispatchOutcome};
pub use error::{ClientError, ClientResult};
pub use http::{create_router, AppState};
pub use protocol::{Command, ControlMessage, InterruptPriority, SubtitleFragment};
pub use router::{MessageRouter, RouteOutcome};
pub use session::{LifecyclePhase, SessionManager, SessionMarker, SessionState};
pub use sink::{BroadcastSink, UiEvent, UiSink};
pub use transcript::{SpeakerRole, SpeakingState, TranscriptReconciler, Utterance};
pub use transport::{InboundFrame, NatsTransport, Transport};
