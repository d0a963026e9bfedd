use tracing::debug;

use super::utterance::{Participants, SpeakerRole, SpeakingState, Utterance};
use crate::protocol::SubtitleFragment;

/// What applying a fragment did to the transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Transcript content changed
    pub changed: bool,
    /// An open agent utterance was cut off by the user
    pub interrupted_agent: bool,
    /// Speaking state before and after differ
    pub speaking_changed: bool,
}

/// Folds subtitle fragments into an ordered transcript
///
/// Fragments are cumulative snapshots of the current utterance, so an update
/// for the open utterance replaces its text rather than appending to it. At
/// most one utterance is open (not final) at a time, and it is always the last.
pub struct TranscriptReconciler {
    participants: Participants,
    utterances: Vec<Utterance>,
}

impl TranscriptReconciler {
    pub fn new(participants: Participants) -> Self {
        Self {
            participants,
            utterances: Vec::new(),
        }
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    fn open_index(&self) -> Option<usize> {
        match self.utterances.last() {
            Some(last) if !last.is_final => Some(self.utterances.len() - 1),
            _ => None,
        }
    }

    /// The utterance still receiving updates, if any
    pub fn open_utterance(&self) -> Option<&Utterance> {
        self.open_index().map(|i| &self.utterances[i])
    }

    pub fn speaking_state(&self) -> SpeakingState {
        match self.open_utterance().map(|u| u.role) {
            Some(SpeakerRole::Agent) => SpeakingState {
                agent_talking: true,
                user_talking: false,
            },
            Some(SpeakerRole::User) => SpeakingState {
                agent_talking: false,
                user_talking: true,
            },
            _ => SpeakingState::default(),
        }
    }

    /// Apply one subtitle fragment
    pub fn apply(&mut self, fragment: &SubtitleFragment) -> ApplyOutcome {
        let before = self.speaking_state();
        let mut outcome = ApplyOutcome::default();

        let amend = self.open_index().filter(|&i| {
            self.utterances[i].speaker == fragment.user_id && !fragment.paragraph
        });

        match amend {
            Some(i) => {
                if fragment.text.is_empty() {
                    debug!("Ignoring empty fragment from {}", fragment.user_id);
                    return outcome;
                }

                let open = &mut self.utterances[i];
                open.text.clone_from(&fragment.text);
                open.is_final = fragment.definite;
                outcome.changed = true;
            }
            None => {
                // Only a paragraph opener may be empty
                if fragment.text.is_empty() && !fragment.paragraph {
                    debug!("Ignoring empty fragment from {}", fragment.user_id);
                    return outcome;
                }

                let role = self.participants.role_of(&fragment.user_id);

                if role == SpeakerRole::User {
                    outcome.interrupted_agent = self.interrupt();
                }
                self.seal_open();

                let mut utterance = Utterance::open(&fragment.user_id, role, &fragment.text);
                utterance.is_final = fragment.definite;
                self.utterances.push(utterance);
                outcome.changed = true;
            }
        }

        outcome.speaking_changed = before != self.speaking_state();
        outcome
    }

    /// Cut off the open agent utterance
    ///
    /// Seals it and flags it interrupted. Returns whether anything was marked.
    pub fn interrupt(&mut self) -> bool {
        let Some(i) = self.open_index() else {
            return false;
        };

        let open = &mut self.utterances[i];
        if open.role != SpeakerRole::Agent {
            return false;
        }

        debug!("Marking agent utterance {} as interrupted", i);
        open.is_final = true;
        open.is_interrupted = true;
        true
    }

    fn seal_open(&mut self) {
        if let Some(i) = self.open_index() {
            self.utterances[i].is_final = true;
        }
    }
}
