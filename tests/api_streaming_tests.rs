//! Streaming endpoint integration tests
//!
//! Exercise the SSE route end to end with fixture transports: every
//! response is a sequence of `data:` events ending in exactly one event
//! with `is_final: true`, including when the engine fails mid-stream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use huginn_api::{build_router, ApiConfig, ApiState};
use huginn_core::engine::{FakeTransport, Transport};
use huginn_core::{ChatService, EngineConfig, GeminiEngine};

fn router_with_transport(transport: FakeTransport) -> axum::Router {
    let config = EngineConfig {
        api_key: "test-key".to_string(),
        model_id: "gemini-2.5-flash".to_string(),
        base_url: "https://example.test/v1beta".to_string(),
    };
    let engine = GeminiEngine::with_transport(
        config.base_url.clone(),
        config.model_id.clone(),
        config.api_key.clone(),
        Transport::Fake(transport),
    );
    let chat = Arc::new(ChatService::with_engine(config, engine));
    let api_config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 8000,
        version: "0.1.0".to_string(),
        allowed_origins: vec!["http://localhost:8080".to_string()],
    };
    build_router(Arc::new(ApiState { chat }), &api_config)
}

fn engine_sse(text: &str) -> String {
    format!(
        "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{text}\"}}]}}}}]}}\n"
    )
}

fn stream_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/chat/messages/stream")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect the SSE body and parse each data event as a JSON chunk
async fn collect_chunks(response: axum::response::Response) -> Vec<serde_json::Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter(|data| !data.is_empty())
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn test_stream_two_chunks_then_final() {
    let sse = format!("{}{}", engine_sse("Hel"), engine_sse("lo"));
    let router = router_with_transport(FakeTransport::with_stream(&sse));

    let response = router
        .oneshot(stream_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let chunks = collect_chunks(response).await;
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["content"], "Hel");
    assert_eq!(chunks[0]["is_final"], false);
    assert_eq!(chunks[1]["content"], "lo");
    assert_eq!(chunks[1]["is_final"], false);
    assert_eq!(chunks[2]["content"], "");
    assert_eq!(chunks[2]["is_final"], true);
}

#[tokio::test]
async fn test_stream_exactly_one_final_event() {
    let sse = format!("{}{}{}", engine_sse("a"), engine_sse("b"), engine_sse("c"));
    let router = router_with_transport(FakeTransport::with_stream(&sse));

    let response = router
        .oneshot(stream_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    let chunks = collect_chunks(response).await;

    let finals: Vec<_> = chunks.iter().filter(|c| c["is_final"] == true).collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(chunks.last().unwrap()["is_final"], true);
}

#[tokio::test]
async fn test_stream_error_surfaces_in_band() {
    let sse = format!("{}{}", engine_sse("Hel"), engine_sse("lo"));
    let router = router_with_transport(FakeTransport::with_stream_then_error(&sse, "engine gone"));

    let response = router
        .oneshot(stream_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    // Transport-level success: the failure is an in-band terminal event
    assert_eq!(response.status(), StatusCode::OK);

    let chunks = collect_chunks(response).await;
    assert_eq!(chunks.len(), 3);
    let last = &chunks[2];
    assert_eq!(last["is_final"], true);
    let content = last["content"].as_str().unwrap();
    assert!(content.starts_with("Error: "));
    assert!(content.contains("engine gone"));
}

#[tokio::test]
async fn test_stream_thinking_mode_thoughts_channel() {
    let sse = "data: {\"candidates\":[{\"content\":{\"parts\":[\
               {\"text\":\"mulling\",\"thought\":true},{\"text\":\"Hi\"}]}}]}\n";
    let router = router_with_transport(FakeTransport::with_stream(sse));

    let response = router
        .oneshot(stream_request(r#"{"message":"Hello","thinking_mode":true}"#))
        .await
        .unwrap();
    let chunks = collect_chunks(response).await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0]["content"], "Hi");
    assert_eq!(chunks[0]["thoughts"], "mulling");
    assert_eq!(chunks[1]["is_final"], true);
}

#[tokio::test]
async fn test_stream_validation_rejected_before_streaming() {
    let router = router_with_transport(FakeTransport::with_error("must not be called"));

    let response = router
        .oneshot(stream_request(r#"{"message":""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_stream_configuration_error_before_streaming() {
    let chat = Arc::new(ChatService::new(EngineConfig {
        api_key: String::new(),
        model_id: "gemini-2.5-flash".to_string(),
        base_url: "https://example.test/v1beta".to_string(),
    }));
    let api_config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 8000,
        version: "0.1.0".to_string(),
        allowed_origins: Vec::new(),
    };
    let router = build_router(Arc::new(ApiState { chat }), &api_config);

    let response = router
        .oneshot(stream_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
