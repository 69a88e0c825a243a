use tracing::{debug, info, warn};

use crate::{
    document::PdfDocument,
    error::ValidationError,
    session::{reduce, SessionEvent, SessionState},
    transport::{DocumentUpload, Gateway, QuestionRequest, RequestOutcome},
};

pub const UPLOAD_FAILED: &str = "Upload failed";
pub const ASK_FAILED: &str = "Failed to get answer";

/// Validates user actions, issues at most one request at a time through the
/// gateway, and folds every outcome back into [`SessionState`].
pub struct SessionController<G: Gateway> {
    gateway: G,
    state: SessionState,
}

impl<G: Gateway> SessionController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn edit_question(&mut self, text: &str) {
        self.apply(SessionEvent::QuestionEdited(text.to_string()));
    }

    pub async fn submit_upload(
        &mut self,
        file: Option<PdfDocument>,
        email: Option<&str>,
    ) -> &SessionState {
        if !self.state.can_upload() {
            debug!(phase = ?self.state.phase(), "upload ignored while a request is in flight");
            return &self.state;
        }

        let Some(document) = file else {
            self.apply(SessionEvent::ValidationFailed(ValidationError::MissingFile));
            return &self.state;
        };
        let email = email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        self.apply(SessionEvent::UploadStarted);
        info!(file_name = %document.file_name, size_bytes = document.bytes.len(), "uploading document");

        let outcome = self
            .gateway
            .ingest_document(DocumentUpload { document, email })
            .await;

        let event = match outcome {
            RequestOutcome::Success(response) => {
                info!(session_id = %response.session_id, num_chunks = ?response.num_chunks, "document ingested");
                SessionEvent::UploadSucceeded {
                    session_id: response.session_id,
                    num_chunks: response.num_chunks,
                }
            }
            RequestOutcome::BackendError { status, detail } => {
                warn!(status, detail = ?detail, "upload rejected");
                SessionEvent::UploadFailed(detail.unwrap_or_else(|| UPLOAD_FAILED.to_string()))
            }
            RequestOutcome::TransportError(reason) => {
                warn!(%reason, "upload did not reach the gateway");
                SessionEvent::UploadFailed(UPLOAD_FAILED.to_string())
            }
        };
        self.apply(event);
        &self.state
    }

    pub async fn submit_question(&mut self, question: &str) -> &SessionState {
        if self.state.is_busy() {
            debug!(phase = ?self.state.phase(), "question ignored while a request is in flight");
            return &self.state;
        }

        self.apply(SessionEvent::QuestionEdited(question.to_string()));

        let Some(session_id) = self.state.session_id().cloned() else {
            self.apply(SessionEvent::ValidationFailed(ValidationError::MissingSession));
            return &self.state;
        };
        if question.is_empty() {
            self.apply(SessionEvent::ValidationFailed(ValidationError::EmptyQuestion));
            return &self.state;
        }

        self.apply(SessionEvent::AskStarted);
        let outcome = self
            .gateway
            .answer_question(QuestionRequest {
                session_id,
                query: question.to_string(),
            })
            .await;

        let event = match outcome {
            RequestOutcome::Success(response) => SessionEvent::AnswerReceived(response.answer),
            RequestOutcome::BackendError { status, detail } => {
                warn!(status, detail = ?detail, "question rejected");
                SessionEvent::AskFailed(detail.unwrap_or_else(|| ASK_FAILED.to_string()))
            }
            RequestOutcome::TransportError(reason) => {
                warn!(%reason, "question did not reach the gateway");
                SessionEvent::AskFailed(ASK_FAILED.to_string())
            }
        };
        self.apply(event);
        &self.state
    }

    fn apply(&mut self, event: SessionEvent) {
        let before = self.state.phase();
        self.state = reduce(&self.state, event);
        if before != self.state.phase() {
            debug!(from = ?before, to = ?self.state.phase(), "session phase changed");
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
