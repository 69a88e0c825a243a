use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use shared::domain::BackendOperation;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod proxy;

use app_state::AppState;
use config::{load_settings, prepare_backend_base_url};
use proxy::{forward, ProxyReply};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let backend_base_url = prepare_backend_base_url(&settings.backend_base_url)?;

    let state = AppState::new(backend_base_url.clone());
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, backend = %backend_base_url, "gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            BackendOperation::IngestDocument.gateway_route(),
            post(proxy_upload_pdf),
        )
        .route(
            BackendOperation::AnswerQuestion.gateway_route(),
            post(proxy_ask),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn proxy_upload_pdf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyReply {
    forward(&state, BackendOperation::IngestDocument, &headers, body).await
}

async fn proxy_ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyReply {
    forward(&state, BackendOperation::AnswerQuestion, &headers, body).await
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
