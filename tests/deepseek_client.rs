use research_chat::error::ProviderError;
use research_chat::{
    ChatRequest, CompletionProvider, Config, DeepSeekClient, Message, ResponseCoordinator, Role,
    FALLBACK_MESSAGE,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: String) -> Config {
    Config {
        api_key: "sk-test".to_string(),
        base_url,
        model: "deepseek-chat".to_string(),
        temperature: 0.7,
        max_history: 20,
        timeout: None,
    }
}

fn sse_body(events: &[&str]) -> String {
    events.iter().map(|e| format!("data: {}\n\n", e)).collect()
}

fn delta(content: &str) -> String {
    json!({ "choices": [{ "index": 0, "delta": { "content": content } }] }).to_string()
}

fn request(user: &str) -> ChatRequest {
    ChatRequest {
        model: "deepseek-chat".to_string(),
        messages: vec![Message::new(Role::User, user)],
        temperature: 0.7,
        stream: true,
    }
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_streams_deltas_in_order() {
    let server = MockServer::start().await;
    let role = json!({ "choices": [{ "delta": { "role": "assistant" } }] }).to_string();
    let (hel, lo) = (delta("Hel"), delta("lo"));
    mount_stream(&server, sse_body(&[role.as_str(), hel.as_str(), lo.as_str(), "[DONE]"])).await;

    let client = DeepSeekClient::new(&test_config(server.uri()));
    let mut chunks = Vec::new();
    let full = client
        .stream_chat(&request("hi"), &mut |chunk: &str| chunks.push(chunk.to_string()))
        .await
        .unwrap();

    assert_eq!(chunks, vec!["Hel", "lo"]);
    assert_eq!(full, "Hello");
}

#[tokio::test]
async fn test_sends_bearer_token_and_streaming_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "stream": true,
            "messages": [{ "role": "user", "content": "ping" }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&[delta("pong").as_str(), "[DONE]"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(&test_config(server.uri()));
    let full = client.stream_chat(&request("ping"), &mut |_: &str| {}).await.unwrap();

    assert_eq!(full, "pong");
}

#[tokio::test]
async fn test_stream_without_done_marker_still_completes() {
    let server = MockServer::start().await;
    let body = format!("data: {}\n\ndata: {}", delta("Grüße, "), delta("世界"));
    mount_stream(&server, body).await;

    let client = DeepSeekClient::new(&test_config(server.uri()));
    let mut chunks = Vec::new();
    let full = client
        .stream_chat(&request("hi"), &mut |chunk: &str| chunks.push(chunk.to_string()))
        .await
        .unwrap();

    assert_eq!(chunks, vec!["Grüße, ", "世界"]);
    assert_eq!(full, "Grüße, 世界");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Authentication Fails", "type": "authentication_error" }
        })))
        .mount(&server)
        .await;

    let client = DeepSeekClient::new(&test_config(server.uri()));
    let err = client.stream_chat(&request("hi"), &mut |_: &str| {}).await.unwrap_err();

    match err {
        ProviderError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Authentication Fails"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_payload_mid_stream() {
    let server = MockServer::start().await;
    let error = json!({ "error": { "message": "server overloaded" } }).to_string();
    mount_stream(&server, sse_body(&[delta("par").as_str(), error.as_str()])).await;

    let client = DeepSeekClient::new(&test_config(server.uri()));
    let mut chunks = Vec::new();
    let err = client
        .stream_chat(&request("hi"), &mut |chunk: &str| chunks.push(chunk.to_string()))
        .await
        .unwrap_err();

    assert_eq!(chunks, vec!["par"]);
    assert!(matches!(err, ProviderError::Stream(ref m) if m == "server overloaded"));
}

#[tokio::test]
async fn test_session_round_trip_over_http() {
    let server = MockServer::start().await;
    let (hel, lo) = (delta("Hel"), delta("lo"));
    mount_stream(&server, sse_body(&[hel.as_str(), lo.as_str(), "[DONE]"])).await;

    let config = test_config(server.uri());
    let mut session = ResponseCoordinator::from_config(DeepSeekClient::new(&config), &config);
    let mut chunks = Vec::new();
    session
        .generate_response("hi", |chunk| chunks.push(chunk.to_string()))
        .await;

    assert_eq!(chunks, vec!["Hel", "lo"]);
    assert_eq!(
        session.history().last(),
        Some(&Message::new(Role::Assistant, "Hello"))
    );
}

#[tokio::test]
async fn test_session_falls_back_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let config = test_config(server.uri());
    let mut session = ResponseCoordinator::from_config(DeepSeekClient::new(&config), &config);
    let mut chunks = Vec::new();
    session
        .generate_response("hi", |chunk| chunks.push(chunk.to_string()))
        .await;

    assert_eq!(chunks, vec![FALLBACK_MESSAGE]);
    let history = session.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1], Message::new(Role::User, "hi"));
    assert_eq!(history[2], Message::new(Role::Assistant, FALLBACK_MESSAGE));
}
