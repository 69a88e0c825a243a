//! Requests from the client to the gateway's public routes.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{BackendOperation, SessionId},
    error::extract_detail,
    protocol::{
        AskResponse, UploadPdfResponse, EMAIL_FIELD, PDF_FIELD, PDF_MIME_TYPE, QUERY_FIELD,
        SESSION_ID_FIELD,
    },
};
use tracing::{debug, warn};

use crate::document::PdfDocument;

/// How a single request ended. Exactly one of these is produced per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    Success(T),
    /// The gateway answered, but not with a usable 2xx payload.
    BackendError {
        status: u16,
        detail: Option<String>,
    },
    /// No response was received.
    TransportError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub document: PdfDocument,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub session_id: SessionId,
    pub query: String,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn ingest_document(&self, upload: DocumentUpload) -> RequestOutcome<UploadPdfResponse>;
    async fn answer_question(&self, request: QuestionRequest) -> RequestOutcome<AskResponse>;
}

pub struct HttpGateway {
    http: Client,
    gateway_url: String,
}

impl HttpGateway {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), gateway_url)
    }

    pub fn with_client(http: Client, gateway_url: impl Into<String>) -> Self {
        let gateway_url = gateway_url.into().trim_end_matches('/').to_string();
        Self { http, gateway_url }
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        operation: BackendOperation,
        form: Form,
    ) -> RequestOutcome<T> {
        let url = format!("{}{}", self.gateway_url, operation.gateway_route());

        let response = match self.http.post(&url).multipart(form).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(operation = operation.name(), %url, %error, "gateway request failed");
                return RequestOutcome::TransportError(error.to_string());
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(error) => {
                warn!(operation = operation.name(), %url, %error, "failed to read gateway response");
                return RequestOutcome::TransportError(error.to_string());
            }
        };

        if status.is_success() {
            match serde_json::from_str::<T>(&text) {
                Ok(payload) => return RequestOutcome::Success(payload),
                Err(error) => debug!(
                    operation = operation.name(),
                    %error,
                    "2xx response without the expected payload"
                ),
            }
        }

        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(extract_detail);
        RequestOutcome::BackendError {
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn ingest_document(&self, upload: DocumentUpload) -> RequestOutcome<UploadPdfResponse> {
        let part = match pdf_part(upload.document) {
            Ok(part) => part,
            Err(error) => return RequestOutcome::TransportError(error.to_string()),
        };
        let mut form = Form::new().part(PDF_FIELD, part);
        if let Some(email) = upload.email {
            form = form.text(EMAIL_FIELD, email);
        }
        self.post_form(BackendOperation::IngestDocument, form).await
    }

    async fn answer_question(&self, request: QuestionRequest) -> RequestOutcome<AskResponse> {
        let form = Form::new()
            .text(SESSION_ID_FIELD, request.session_id.0)
            .text(QUERY_FIELD, request.query);
        self.post_form(BackendOperation::AnswerQuestion, form).await
    }
}

fn pdf_part(document: PdfDocument) -> reqwest::Result<Part> {
    Part::bytes(document.bytes)
        .file_name(document.file_name)
        .mime_str(PDF_MIME_TYPE)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
