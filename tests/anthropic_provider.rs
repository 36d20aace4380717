mod common;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use mindspark::prompt;
use mindspark::provider::anthropic::{Anthropic, API_KEY_VAR};
use mindspark::provider::CompletionService;
use mindspark::wire::Mode;
use serde_json::{json, Value};
use std::time::Duration;

use common::spawn_router;

async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let header = |k: &str| headers.get(k).and_then(|v| v.to_str().ok()).map(str::to_string);
    if header("x-api-key").as_deref() != Some("test-key") || header("anthropic-version").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": { "message": "bad key" } })));
    }
    let system_ok = body["system"].as_str().is_some_and(|s| !s.is_empty());
    (
        StatusCode::OK,
        Json(json!({
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": format!("system={system_ok} max={}", body["max_tokens"]) }
            ]
        })),
    )
}

#[tokio::test]
async fn anthropic_adapter_picks_the_text_block() {
    std::env::set_var(API_KEY_VAR, "test-key");
    let base = spawn_router(Router::new().route("/v1/messages", post(messages))).await;

    let provider = Anthropic::new("claude-test".into(), base, Duration::from_secs(5)).unwrap();
    let p = prompt::build(Mode::Flashcards, "notes");
    let text = provider.complete(&p).await.unwrap();
    assert_eq!(text, format!("system=true max={}", p.max_tokens));
}

#[tokio::test]
async fn anthropic_adapter_rejects_empty_content() {
    std::env::set_var(API_KEY_VAR, "test-key");
    let app = Router::new().route("/v1/messages", post(|| async { Json(json!({ "content": [] })) }));
    let base = spawn_router(app).await;

    let provider = Anthropic::new("claude-test".into(), base, Duration::from_secs(5)).unwrap();
    let err = provider.complete(&prompt::build(Mode::Summary, "notes")).await.unwrap_err();
    assert!(err.to_string().contains("empty content"), "{err}");
}

#[tokio::test]
async fn anthropic_adapter_surfaces_http_errors() {
    std::env::set_var(API_KEY_VAR, "test-key");
    let app = Router::new().route("/v1/messages", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }));
    let base = spawn_router(app).await;

    let provider = Anthropic::new("claude-test".into(), base, Duration::from_secs(5)).unwrap();
    let err = provider.complete(&prompt::build(Mode::Quiz, "notes")).await.unwrap_err();
    assert!(err.to_string().contains("503"), "{err}");
}
