//! Lifecycle state and the reducer that drives it.

use shared::domain::SessionId;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Ready,
    Asking,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Asking)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSession {
    id: SessionId,
    num_chunks: Option<u64>,
}

/// Snapshot of everything the presentation layer shows. A new value is
/// produced for every transition; the previous one is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    phase: Phase,
    session: Option<ActiveSession>,
    question: String,
    answer: Option<String>,
    error: Option<String>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn can_upload(&self) -> bool {
        !self.is_busy()
    }

    pub fn can_ask(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|session| &session.id)
    }

    pub fn num_chunks(&self) -> Option<u64> {
        self.session.as_ref().and_then(|session| session.num_chunks)
    }

    /// Pending question text.
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The active error, or an empty string when there is none.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }

    fn settled_phase(&self) -> Phase {
        if self.session.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    QuestionEdited(String),
    ValidationFailed(ValidationError),
    UploadStarted,
    UploadSucceeded {
        session_id: SessionId,
        num_chunks: Option<u64>,
    },
    UploadFailed(String),
    AskStarted,
    AnswerReceived(String),
    AskFailed(String),
}

/// Computes the state that follows `event`.
///
/// Events that are not valid in the current phase (a second request while one
/// is in flight, a completion for a request that was never started) leave the
/// state untouched. A failed upload keeps whatever session, answer and question
/// were there before; only a successful upload replaces them.
pub fn reduce(state: &SessionState, event: SessionEvent) -> SessionState {
    let mut next = state.clone();

    match event {
        SessionEvent::QuestionEdited(text) => {
            next.question = text;
        }
        SessionEvent::ValidationFailed(error) => {
            next.error = Some(error.to_string());
        }
        SessionEvent::UploadStarted => {
            if !state.can_upload() {
                return next;
            }
            next.error = None;
            next.phase = Phase::Uploading;
        }
        SessionEvent::UploadSucceeded {
            session_id,
            num_chunks,
        } => {
            if state.phase != Phase::Uploading {
                return next;
            }
            next.session = Some(ActiveSession {
                id: session_id,
                num_chunks,
            });
            next.answer = None;
            next.question.clear();
            next.error = None;
            next.phase = Phase::Ready;
        }
        SessionEvent::UploadFailed(message) => {
            if state.phase != Phase::Uploading {
                return next;
            }
            next.error = Some(message);
            next.phase = next.settled_phase();
        }
        SessionEvent::AskStarted => {
            if !state.can_ask() {
                return next;
            }
            next.error = None;
            next.phase = Phase::Asking;
        }
        SessionEvent::AnswerReceived(answer) => {
            if state.phase != Phase::Asking {
                return next;
            }
            next.answer = Some(answer);
            next.error = None;
            next.phase = next.settled_phase();
        }
        SessionEvent::AskFailed(message) => {
            if state.phase != Phase::Asking {
                return next;
            }
            next.error = Some(message);
            next.phase = next.settled_phase();
        }
    }

    next
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
