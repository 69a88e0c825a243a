use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-issued token naming one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOperation {
    IngestDocument,
    AnswerQuestion,
}

impl BackendOperation {
    /// Path appended to the backend base address.
    pub fn backend_path(self) -> &'static str {
        match self {
            Self::IngestDocument => "/upload_pdf/",
            Self::AnswerQuestion => "/ask/",
        }
    }

    /// Route the gateway exposes for this operation.
    pub fn gateway_route(self) -> &'static str {
        match self {
            Self::IngestDocument => "/api/upload_pdf",
            Self::AnswerQuestion => "/api/ask",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::IngestDocument => "ingest_document",
            Self::AnswerQuestion => "answer_question",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
