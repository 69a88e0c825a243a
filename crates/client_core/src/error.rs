use thiserror::Error;

/// Rejections raised locally, before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a PDF file.")]
    MissingFile,
    #[error("Please upload a PDF first.")]
    MissingSession,
    #[error("Please enter a question.")]
    EmptyQuestion,
}
