//! Client-side session lifecycle for asking questions about an uploaded PDF.
//!
//! [`SessionController`] owns the only mutable state. Every transition goes
//! through the pure [`reduce`] function, and every network call goes through a
//! [`Gateway`], so the whole lifecycle can be exercised without a live backend.

pub mod controller;
pub mod document;
pub mod error;
pub mod session;
pub mod transport;

pub use controller::SessionController;
pub use document::PdfDocument;
pub use error::ValidationError;
pub use session::{reduce, Phase, SessionEvent, SessionState};
pub use shared::domain::SessionId;
pub use transport::{DocumentUpload, Gateway, HttpGateway, QuestionRequest, RequestOutcome};
