//! Agent session management
//!
//! This module provides the `SessionManager` abstraction that manages:
//! - Room join/leave through the transport
//! - Remote agent start/stop/update through the lifecycle API
//! - The persisted session marker that survives client restarts
//! - The shared "enabled" flag gating outbound commands

mod marker;
mod session;
mod state;

pub use marker::{SessionMarker, SessionRecord};
pub use session::SessionManager;
pub use state::{EnabledFlag, LifecyclePhase, SessionState};
