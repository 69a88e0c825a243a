use serde::{Deserialize, Serialize};

use crate::domain::SessionId;

pub const PDF_FIELD: &str = "pdf";
pub const EMAIL_FIELD: &str = "email";
pub const SESSION_ID_FIELD: &str = "session_id";
pub const QUERY_FIELD: &str = "query";

pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_chunks: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}
