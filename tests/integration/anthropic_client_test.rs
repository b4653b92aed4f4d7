// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use compwatch::config::settings::LlmSettings;
use compwatch::domain::models::change::Severity;
use compwatch::domain::services::classifier_service::{
    ChangeClassifier, LlmChangeClassifier, LlmClient, LlmError,
};
use compwatch::domain::services::diff_service::compute_diff;
use compwatch::infrastructure::services::anthropic_client::{AnthropicClient, ANTHROPIC_VERSION};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: &str, api_key: Option<&str>) -> LlmSettings {
    LlmSettings {
        api_key: api_key.map(str::to_string),
        model: "claude-sonnet-4-6".to_string(),
        api_base_url: base_url.to_string(),
        max_tokens: 1024,
        timeout_secs: 5,
    }
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    }))
}

#[tokio::test]
async fn test_complete_returns_first_text_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", ANTHROPIC_VERSION))
        .respond_with(text_response("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&settings(&server.uri(), Some("test-key"))).unwrap();
    assert!(client.is_configured());

    let reply = client.complete("system", "prompt").await.unwrap();
    assert_eq!(reply, "hello");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&settings(&server.uri(), Some("test-key"))).unwrap();
    let result = client.complete("system", "prompt").await;

    assert!(matches!(
        result,
        Err(LlmError::Status { status: 503, ref body }) if body == "overloaded"
    ));
}

/// 分类器通过真实客户端解析代码块包裹的JSON回复
#[tokio::test]
async fn test_classifier_parses_fenced_reply() {
    let server = MockServer::start().await;
    let reply = "```json\n{\"summary\": \"Pro plan price raised to $45\", \"severity\": \"high\", \"keyChanges\": [\"Pro $30 -> $45\"]}\n```";
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(text_response(reply))
        .mount(&server)
        .await;

    let client = Arc::new(AnthropicClient::new(&settings(&server.uri(), Some("test-key"))).unwrap());
    let classifier = LlmChangeClassifier::new(client);
    let diff = compute_diff("Pro plan $30/month", "Pro plan $45/month");

    let outcome = classifier
        .classify("Acme", "https://acme.test/pricing", &diff)
        .await;

    assert!(!outcome.is_fallback());
    let classification = outcome.into_classification();
    assert_eq!(classification.severity, Severity::High);
    assert_eq!(classification.summary, "Pro plan price raised to $45");
}

#[tokio::test]
async fn test_configured_timeout_is_applied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(text_response("late").set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut slow = settings(&server.uri(), Some("test-key"));
    slow.timeout_secs = 1;
    let client = AnthropicClient::new(&slow).unwrap();

    let result = client.complete("system", "prompt").await;
    assert!(matches!(result, Err(LlmError::Request(_))));
}

#[tokio::test]
async fn test_missing_api_key_falls_back_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("not json"))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&settings(&server.uri(), None)).unwrap();
    let classifier = LlmChangeClassifier::new(Arc::new(client));
    let diff = compute_diff("a", "b");

    let outcome = classifier.classify("Acme", "https://acme.test", &diff).await;
    assert!(outcome.is_fallback());
}
