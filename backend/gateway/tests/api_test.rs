use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use charmline_core::{GenerationParams, InputSource};
use charmline_gateway::{GatewayState, build_router};
use charmline_generation::{GenerationClient, MockProvider};
use charmline_pipeline::{PromptBuilder, SuggestionPipeline};
use charmline_understanding::{MockOcrBackend, TextExtractor};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H'];
const BOUNDARY: &str = "charmline-test-boundary";

fn app(ocr: Arc<MockOcrBackend>, llm: Arc<MockProvider>) -> Router {
    app_with_limit(ocr, llm, 1024 * 1024)
}

fn app_with_limit(ocr: Arc<MockOcrBackend>, llm: Arc<MockProvider>, max_upload_bytes: usize) -> Router {
    let pipeline = SuggestionPipeline::new(
        TextExtractor::new(ocr),
        GenerationClient::new(llm, GenerationParams::default()),
    );
    build_router(GatewayState::new(pipeline), max_upload_bytes)
}

fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"chat.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn prompt_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/prompt")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let raw = String::from_utf8(bytes.to_vec()).unwrap();
    let body: Value = serde_json::from_str(&raw).unwrap();
    (status, body, raw)
}

fn assert_single_field(body: &Value) {
    let obj = body.as_object().expect("body should be a JSON object");
    assert_eq!(obj.len(), 1, "expected exactly one field, got {body}");
    assert!(obj.contains_key("message") ^ obj.contains_key("error"));
}

#[tokio::test]
async fn prompt_without_input_is_rejected_before_generation() {
    let llm = Arc::new(MockProvider::new("mock"));
    let app = app(Arc::new(MockOcrBackend::with_text("unused")), llm.clone());

    for payload in [json!({ "userInput": "" }), json!({}), json!({ "userInput": "   " })] {
        let (status, body, _) = send(&app, prompt_request(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "no prompt" }));
    }
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn prompt_with_unparseable_body_is_rejected() {
    let llm = Arc::new(MockProvider::new("mock"));
    let app = app(Arc::new(MockOcrBackend::with_text("unused")), llm.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/prompt")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "no prompt" }));

    let (status, _, _) = send(&app, prompt_request(json!({ "userInput": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn upload_without_screenshot_field_is_rejected() {
    let ocr = Arc::new(MockOcrBackend::with_text("unused"));
    let llm = Arc::new(MockProvider::new("mock"));
    let app = app(ocr.clone(), llm.clone());

    let (status, body, _) = send(&app, multipart_request("avatar", PNG)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "no file" }));

    let (status, _, _) = send(&app, multipart_request("screenshot", &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let not_multipart = Request::builder()
        .method("POST")
        .uri("/upload")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send(&app, not_multipart).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "no file" }));

    assert_eq!(ocr.calls(), 0);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn upload_returns_reply_built_from_ocr_text() {
    let ocr = Arc::new(MockOcrBackend::with_text("hello"));
    let llm = Arc::new(MockProvider::new("mock").echoing());
    let app = app(ocr.clone(), llm.clone());

    let (status, body, _) = send(&app, multipart_request("screenshot", PNG)).await;
    assert_eq!(status, StatusCode::OK);
    assert_single_field(&body);

    let expected = PromptBuilder::build(InputSource::Screenshot, "hello");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("hello"));
    assert_eq!(message, expected.user_instruction().trim());
    assert_eq!(ocr.calls(), 1);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn prompt_failure_is_generic_and_does_not_leak() {
    let llm = Arc::new(MockProvider::new("mock").failing("stack trace: key=sk-leaked-secret-value"));
    let app = app(Arc::new(MockOcrBackend::with_text("unused")), llm.clone());

    let (status, body, raw) =
        send(&app, prompt_request(json!({ "userInput": "A: are you free friday?" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "generic error" }));
    assert!(!raw.contains("stack trace"));
    assert!(!raw.contains("sk-leaked-secret-value"));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn upload_ocr_failure_is_server_error() {
    let llm = Arc::new(MockProvider::new("mock"));
    let app = app(Arc::new(MockOcrBackend::failing("Error opening data file kor.traineddata")), llm.clone());

    let (status, body, raw) = send(&app, multipart_request("screenshot", PNG)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "server error" }));
    assert!(!raw.contains("traineddata"));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn oversized_upload_is_treated_as_missing() {
    let ocr = Arc::new(MockOcrBackend::with_text("unused"));
    let llm = Arc::new(MockProvider::new("mock"));
    let app = app_with_limit(ocr.clone(), llm.clone(), 64);

    let mut image = PNG.to_vec();
    image.resize(4096, 0);
    let (status, body, _) = send(&app, multipart_request("screenshot", &image)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "no file" }));
    assert_eq!(ocr.calls(), 0);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn upload_generation_failure_is_server_error() {
    let ocr = Arc::new(MockOcrBackend::with_text("A: dinner on friday?"));
    let llm = Arc::new(MockProvider::new("mock").failing("quota exceeded for org-internal-7731"));
    let app = app(ocr.clone(), llm.clone());

    let (status, body, raw) = send(&app, multipart_request("screenshot", PNG)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "server error" }));
    assert!(!raw.contains("org-internal-7731"));
    assert_eq!(ocr.calls(), 1);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn accepted_requests_always_have_exactly_one_field() {
    let ok = app(
        Arc::new(MockOcrBackend::with_text("hi")),
        Arc::new(MockProvider::new("mock").with_response("hey there 😊")),
    );
    let failing = app(
        Arc::new(MockOcrBackend::with_text("hi")),
        Arc::new(MockProvider::new("mock").with_choices(vec![])),
    );

    for app in [&ok, &failing] {
        let (_, body, _) = send(app, multipart_request("screenshot", PNG)).await;
        assert_single_field(&body);
        let (_, body, _) = send(app, prompt_request(json!({ "userInput": "hi" }))).await;
        assert_single_field(&body);
    }
}

#[tokio::test]
async fn concurrent_prompts_do_not_cross_contaminate() {
    let llm = Arc::new(MockProvider::new("mock").echoing().with_delay(Duration::from_millis(50)));
    let app = app(Arc::new(MockOcrBackend::with_text("unused")), llm.clone());

    let first = send(&app, prompt_request(json!({ "userInput": "alpha-conversation" })));
    let second = send(&app, prompt_request(json!({ "userInput": "bravo-conversation" })));
    let ((s1, b1, _), (s2, b2, _)) = tokio::join!(first, second);

    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    let m1 = b1["message"].as_str().unwrap();
    let m2 = b2["message"].as_str().unwrap();
    assert!(m1.contains("alpha-conversation") && !m1.contains("bravo-conversation"));
    assert!(m2.contains("bravo-conversation") && !m2.contains("alpha-conversation"));
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn health_reports_provider_and_model() {
    let app = app(
        Arc::new(MockOcrBackend::with_text("unused")),
        Arc::new(MockProvider::new("mock")),
    );
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "mock");
    assert_eq!(body["model"], "gpt-4");
}
