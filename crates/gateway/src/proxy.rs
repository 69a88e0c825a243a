//! Single forwarding path shared by every gateway route.

use std::time::Instant;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use shared::{
    domain::BackendOperation,
    error::{ErrorDetail, BACKEND_NOT_REACHABLE},
};
use tracing::{debug, info, warn};

use crate::app_state::AppState;

pub(crate) type ProxyReply = (StatusCode, Json<Value>);

/// Sends `body` unchanged to the backend route for `operation` and relays the
/// backend's status together with a body that is always JSON.
pub(crate) async fn forward(
    state: &AppState,
    operation: BackendOperation,
    headers: &HeaderMap,
    body: Bytes,
) -> ProxyReply {
    let url = format!("{}{}", state.backend_base_url, operation.backend_path());
    let started = Instant::now();

    let mut request = state.http.post(&url).body(body);
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        request = request.header(reqwest::header::CONTENT_TYPE, content_type.as_bytes());
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(error) => return backend_unreachable(operation, &url, &error),
    };

    let backend_status = response.status().as_u16();
    let text = match response.text().await {
        Ok(text) => text,
        Err(error) => return backend_unreachable(operation, &url, &error),
    };

    info!(
        operation = operation.name(),
        status = backend_status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "relayed backend response"
    );

    let status = StatusCode::from_u16(backend_status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(relay_body(operation, &text)))
}

/// Parses the backend body, wrapping anything that is not JSON in `{ detail }`.
pub(crate) fn relay_body(operation: BackendOperation, text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(
                operation = operation.name(),
                %error,
                body_len = text.len(),
                "backend body is not json; wrapping as detail"
            );
            json!({ "detail": ErrorDetail::from_raw_body(text).detail })
        }
    }
}

fn backend_unreachable(
    operation: BackendOperation,
    url: &str,
    error: &reqwest::Error,
) -> ProxyReply {
    warn!(operation = operation.name(), %url, %error, "backend not reachable");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": BACKEND_NOT_REACHABLE })),
    )
}

#[cfg(test)]
#[path = "tests/proxy_tests.rs"]
mod tests;
