//! End-to-end route tests against a mocked upstream backend

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use modelproxy_core::adapters::{resolve, AdapterSettings};
use modelproxy_core::http::HttpClient;
use modelproxy_server::{app, AppState, MemorySink};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router_for(locator: &str, store: Arc<MemorySink>) -> Router {
    let adapter = resolve(locator, &AdapterSettings::default(), HttpClient::new().unwrap()).unwrap();
    app(AppState::new(adapter).with_persistence(store))
}

fn chat(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", "Bearer test-token")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn wait_for_records(store: &MemorySink, count: usize) -> Vec<(i64, String)> {
    for _ in 0..100 {
        let records = store.records();
        if records.len() >= count {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store.records()
}

#[tokio::test]
async fn test_health() {
    let router = router_for("", Arc::new(MemorySink::new()));
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_missing_authorization_is_rejected() {
    let router = router_for("", Arc::new(MemorySink::new()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/model")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"error": "Missing Authorization"}));
}

#[tokio::test]
async fn test_blocking_call_persists_answer() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Hello!"}}]
        })))
        .mount(&upstream)
        .await;

    let store = Arc::new(MemorySink::new());
    let router = router_for(
        &format!("{}/v1/chat/completions", upstream.uri()),
        store.clone(),
    );
    let response = router
        .oneshot(chat(
            "/api/model",
            json!({"messages": [{"role": "user", "content": "Hi"}], "projectId": 7}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"text": "Hello!"}));
    assert_eq!(store.records(), vec![(7, "Hello!".to_string())]);
}

#[tokio::test]
async fn test_blocking_upstream_error_is_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&upstream)
        .await;

    let store = Arc::new(MemorySink::new());
    let router = router_for(&format!("tgi://{}/generate", upstream.uri()), store.clone());
    let response = router
        .oneshot(chat("/api/model", json!({"messages": [], "projectId": 1})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        body,
        json!({"error": "Upstream returned HTTP 502: bad gateway"})
    );
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_invalid_body_is_400() {
    let router = router_for("", Arc::new(MemorySink::new()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/model")
        .header("content-type", "application/json")
        .header("authorization", "Bearer t")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_unsupported_adapter_is_400() {
    let router = router_for("https://api.example.com/v1/chat", Arc::new(MemorySink::new()));
    let response = router
        .oneshot(chat("/api/model/stream", json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"error": "stream not supported by adapter"}));
}

#[tokio::test]
async fn test_stream_relays_deltas_then_done() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "{\"text\":\"Hel\"}\n{\"text\":\"lo\"}\n",
            "application/x-ndjson",
        ))
        .mount(&upstream)
        .await;

    let store = Arc::new(MemorySink::new());
    let router = router_for(&format!("tgi://{}/generate", upstream.uri()), store.clone());
    let response = router
        .oneshot(chat(
            "/api/model/stream",
            json!({"messages": [{"role": "user", "content": "Hi"}], "projectId": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );
    assert_eq!(
        body_string(response).await,
        "data: {\"delta\":\"Hel\"}\n\ndata: {\"delta\":\"lo\"}\n\ndata: [DONE]\n\n"
    );
    assert_eq!(
        wait_for_records(&store, 1).await,
        vec![(3, "Hello".to_string())]
    );
}

#[tokio::test]
async fn test_stream_upstream_error_is_single_error_frame() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&upstream)
        .await;

    let store = Arc::new(MemorySink::new());
    let router = router_for(&format!("localai://{}", upstream.uri()), store.clone());
    let response = router
        .oneshot(chat(
            "/api/model/stream",
            json!({"messages": [], "projectId": 9}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "data: {\"error\":\"Upstream returned HTTP 503: busy\"}\n\n"
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.records().is_empty());
}
