//! Conversation transcript
//!
//! Subtitle fragments arrive as partial snapshots of whatever a speaker is
//! currently saying. The reconciler folds them into an append-only list of
//! utterances and tracks who is mid-utterance.

mod reconciler;
mod utterance;

pub use reconciler::{ApplyOutcome, TranscriptReconciler};
pub use utterance::{Participants, SpeakerRole, SpeakingState, Utterance, AGENT_ID_PREFIX};
