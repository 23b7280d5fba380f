mod common;

use axum::body::{ to_bytes, Body };
use axum::http::{ header, Method, Request, StatusCode };
use chat_relay::llm::chat::{ ContentPart, MessageContent, PromptMessage, PromptRole };
use chat_relay::server::api::router;
use common::{ relay_with, MockChatClient, MockReply, SYSTEM_PROMPT };
use serde_json::{ json, Value };
use tower::ServiceExt;

async fn post_raw(client: std::sync::Arc<MockChatClient>, body: &str) -> (StatusCode, Value) {
    let app = router(relay_with(client));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(client: std::sync::Arc<MockChatClient>, body: Value) -> (StatusCode, Value) {
    post_raw(client, &body.to_string()).await
}

#[tokio::test]
async fn relays_trimmed_message_and_returns_trimmed_reply() {
    let client = MockChatClient::text("  hello  \n");
    let (status, body) = post(client.clone(), json!({ "message": "  hi  " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "hello" }));
    assert_eq!(client.calls(), 1);
    assert_eq!(
        client.last_prompt(),
        vec![PromptMessage::system(SYSTEM_PROMPT), PromptMessage::user("hi")]
    );
}

#[tokio::test]
async fn rejects_missing_or_blank_message_without_calling_provider() {
    for body in [json!({}), json!({ "message": "" }), json!({ "message": "   \t\n" }), json!({ "message": null })] {
        let client = MockChatClient::text("unused");
        let (status, response) = post(client.clone(), body.clone()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(response["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert_eq!(client.calls(), 0);
    }
}

#[tokio::test]
async fn rejects_non_json_body() {
    let client = MockChatClient::text("unused");
    let (status, response) = post_raw(client.clone(), "message=hi").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn normalizes_content_parts() {
    let client = MockChatClient::new(MockReply::Content(MessageContent::Parts(vec![
        ContentPart::Text { text: "a".into() },
        ContentPart::Text { text: "b".into() },
    ])));
    let (status, body) = post(client, json!({ "message": "hi" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ab");
}

#[tokio::test]
async fn empty_provider_reply_is_bad_gateway() {
    for content in [
        MessageContent::Empty,
        MessageContent::Text("   ".into()),
        MessageContent::Parts(Vec::new()),
    ] {
        let client = MockChatClient::new(MockReply::Content(content));
        let (status, body) = post(client.clone(), json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "The assistant returned an empty response.");
        assert_eq!(client.calls(), 1);
    }
}

#[tokio::test]
async fn provider_failure_is_generic_internal_error() {
    let client = MockChatClient::new(MockReply::Fail("quota exceeded for key sk-live-123".into()));
    let (status, body) = post(client, json!({ "message": "hi" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(!error.contains("sk-live-123"));
    assert!(!error.contains("quota"));
}

#[tokio::test]
async fn malformed_history_entries_never_reach_provider() {
    let client = MockChatClient::text("ok");
    let (status, _) = post(
        client.clone(),
        json!({
            "message": "next",
            "history": [
                { "role": "user", "content": "first" },
                { "role": "assistant" },
                { "content": "no role" },
                { "role": "assistant", "content": 5 },
                { "role": "assistant", "content": "second" }
            ]
        })
    ).await;

    assert_eq!(status, StatusCode::OK);
    let prompt = client.last_prompt();
    let summary: Vec<(PromptRole, &str)> = prompt.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (PromptRole::System, SYSTEM_PROMPT),
            (PromptRole::User, "first"),
            (PromptRole::Assistant, "second"),
            (PromptRole::User, "next"),
        ]
    );
}

#[tokio::test]
async fn answers_cors_preflight() {
    let app = router(relay_with(MockChatClient::text("unused")));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
