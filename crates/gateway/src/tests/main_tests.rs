use super::*;
use axum::{
    body::{self, Body},
    extract::Multipart,
    http::{Request, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tokio::{io::AsyncReadExt, net::TcpListener};
use tower::ServiceExt;

const BOUNDARY: &str = "gateway-test-boundary";
const FAKE_PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\nbinary body";

fn test_app(backend_base_url: &str) -> Router {
    build_router(Arc::new(AppState::new(backend_base_url)), 1024 * 1024)
}

async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Address nothing is listening on.
async fn closed_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

/// Accepts connections and hangs up before writing a response.
async fn hang_up_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });
    format!("http://{addr}")
}

fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    if let Some((filename, bytes)) = file {
        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        out.extend_from_slice(bytes);
        out.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

fn multipart_request(route: &str, body: Vec<u8>) -> Request<Body> {
    Request::post(route)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
    let mut file_name = None;
    let mut pdf = Vec::new();
    let mut email = None;
    while let Some(field) = multipart.next_field().await.expect("field") {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                file_name = field.file_name().map(str::to_string);
                pdf = field.bytes().await.expect("pdf bytes").to_vec();
            }
            "email" => email = Some(field.text().await.expect("email")),
            _ => {}
        }
    }
    Json(json!({
        "session_id": "abc123",
        "num_chunks": 3,
        "file_name": file_name,
        "pdf": pdf,
        "email": email,
    }))
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app("http://127.0.0.1:9");
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn upload_forwards_multipart_fields_verbatim() {
    let backend = spawn_backend(Router::new().route("/upload_pdf/", post(echo_upload))).await;
    let app = test_app(&backend);

    let body = multipart_body(Some(("report.pdf", FAKE_PDF)), &[("email", "me@example.com")]);
    let response = app
        .oneshot(multipart_request("/api/upload_pdf", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["session_id"], "abc123");
    assert_eq!(json["file_name"], "report.pdf");
    assert_eq!(json["email"], "me@example.com");
    assert_eq!(json["pdf"], json!(FAKE_PDF));
}

#[tokio::test]
async fn ask_is_routed_to_the_ask_backend_path() {
    async fn answer(mut multipart: Multipart) -> Json<Value> {
        let mut session_id = String::new();
        let mut query = String::new();
        while let Some(field) = multipart.next_field().await.expect("field") {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await.expect("text");
            match name.as_str() {
                "session_id" => session_id = value,
                "query" => query = value,
                _ => {}
            }
        }
        Json(json!({ "answer": format!("{session_id}:{query}") }))
    }

    let backend = spawn_backend(Router::new().route("/ask/", post(answer))).await;
    let app = test_app(&backend);

    let body = multipart_body(None, &[("session_id", "abc123"), ("query", "What is the total?")]);
    let response = app
        .oneshot(multipart_request("/api/ask", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "answer": "abc123:What is the total?" })
    );
}

#[tokio::test]
async fn backend_error_status_and_detail_are_relayed() {
    let backend = spawn_backend(Router::new().route(
        "/ask/",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Session not found. Please upload a PDF first." })),
            )
        }),
    ))
    .await;
    let app = test_app(&backend);

    let body = multipart_body(None, &[("session_id", "gone"), ("query", "hi")]);
    let response = app
        .oneshot(multipart_request("/api/ask", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        read_json(response).await,
        json!({ "detail": "Session not found. Please upload a PDF first." })
    );
}

#[tokio::test]
async fn non_json_backend_body_is_wrapped_with_original_status() {
    let backend = spawn_backend(Router::new().route(
        "/upload_pdf/",
        post(|| async { (StatusCode::BAD_GATEWAY, "oops") }),
    ))
    .await;
    let app = test_app(&backend);

    let body = multipart_body(Some(("a.pdf", FAKE_PDF)), &[]);
    let response = app
        .oneshot(multipart_request("/api/upload_pdf", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(read_json(response).await, json!({ "detail": "oops" }));
}

#[tokio::test]
async fn empty_backend_body_uses_fallback_detail() {
    let backend = spawn_backend(Router::new().route(
        "/ask/",
        post(|| async { StatusCode::BAD_GATEWAY }),
    ))
    .await;
    let app = test_app(&backend);

    let body = multipart_body(None, &[("session_id", "abc123"), ("query", "hi")]);
    let response = app
        .oneshot(multipart_request("/api/ask", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        read_json(response).await,
        json!({ "detail": "Unknown error from backend" })
    );
}

#[tokio::test]
async fn refused_connection_becomes_backend_not_reachable() {
    let app = test_app(&closed_backend().await);

    let body = multipart_body(Some(("a.pdf", FAKE_PDF)), &[]);
    let response = app
        .oneshot(multipart_request("/api/upload_pdf", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "detail": "Backend not reachable" })
    );
}

#[tokio::test]
async fn dropped_connection_is_normalized_like_a_refused_one() {
    let app = test_app(&hang_up_backend().await);

    let body = multipart_body(None, &[("session_id", "abc123"), ("query", "hi")]);
    let response = app
        .oneshot(multipart_request("/api/ask", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "detail": "Backend not reachable" })
    );
}

#[tokio::test]
async fn unresolvable_backend_host_is_normalized_like_a_refused_one() {
    let app = test_app("http://nonexistent.invalid");

    let body = multipart_body(Some(("a.pdf", FAKE_PDF)), &[]);
    let response = app
        .oneshot(multipart_request("/api/upload_pdf", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "detail": "Backend not reachable" })
    );
}

#[tokio::test]
async fn oversized_body_is_rejected_before_forwarding() {
    let app = build_router(Arc::new(AppState::new(closed_backend().await)), 16);

    let body = multipart_body(Some(("big.pdf", &[0u8; 256][..])), &[]);
    let response = app
        .oneshot(multipart_request("/api/upload_pdf", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
