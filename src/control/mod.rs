//! Outbound agent commands

mod dispatcher;

pub use dispatcher::{CommandDispatcher, DispatchOutcome};
