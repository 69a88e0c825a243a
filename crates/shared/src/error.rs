use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BACKEND_NOT_REACHABLE: &str = "Backend not reachable";
pub const UNKNOWN_BACKEND_ERROR: &str = "Unknown error from backend";

/// The `{ "detail": ... }` envelope every error response carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Wraps a body that was not valid JSON.
    pub fn from_raw_body(raw: &str) -> Self {
        if raw.is_empty() {
            Self::new(UNKNOWN_BACKEND_ERROR)
        } else {
            Self::new(raw)
        }
    }
}

/// User-facing text of a JSON body's `detail` field, if it carries one.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
