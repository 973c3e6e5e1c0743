//! Provider HTTP tests against a local axum stub server.

use axum::{http::StatusCode, routing::post, Router};
use ethicist_core::config::LlmConfig;
use ethicist_core::CompletionError;
use ethicist_reasoning::llm::{CompletionClient, CompletionParams, CompletionRequest};
use ethicist_reasoning::providers::{AnthropicClient, OpenAiClient};

/// Serve a single canned response on both provider paths; returns the base URL.
async fn stub(status: StatusCode, body: &'static str) -> String {
    let handler = move || async move { (status, body) };
    let app = Router::new()
        .route("/v1/messages", post(handler))
        .route("/chat/completions", post(handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(base_url: String) -> LlmConfig {
    LlmConfig {
        base_url: Some(base_url),
        api_key: Some("test-key".into()),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system: "You are an AI ethics analyst.".into(),
        prompt: "Scenario: test".into(),
        params: CompletionParams::default(),
    }
}

async fn anthropic(status: StatusCode, body: &'static str) -> Result<String, CompletionError> {
    let client = AnthropicClient::from_config(&config(stub(status, body).await)).unwrap();
    client.complete(request()).await.map(|c| c.text)
}

#[tokio::test]
async fn test_anthropic_success() {
    let text = anthropic(
        StatusCode::OK,
        r#"{"content":[{"type":"text","text":"Consider consent."}],"stop_reason":"end_turn"}"#,
    )
    .await
    .unwrap();
    assert_eq!(text, "Consider consent.");
}

#[tokio::test]
async fn test_anthropic_rate_limit() {
    let err = anthropic(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"type":"error","error":{"type":"rate_limit_error","message":"Too many requests"}}"#,
    )
    .await
    .unwrap_err();
    assert_eq!(err, CompletionError::RateLimit("Too many requests".into()));
}

#[tokio::test]
async fn test_anthropic_authentication() {
    let err = anthropic(
        StatusCode::UNAUTHORIZED,
        r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "authentication");
}

#[tokio::test]
async fn test_anthropic_garbage_body() {
    let err = anthropic(StatusCode::OK, "<html>not json</html>")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "malformed_response");
}

#[tokio::test]
async fn test_anthropic_server_error() {
    let err = anthropic(StatusCode::SERVICE_UNAVAILABLE, "overloaded")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CompletionError::Api {
            status: 503,
            message: "overloaded".into()
        }
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AnthropicClient::from_config(&config(format!("http://{}", addr))).unwrap();
    let err = client.complete(request()).await.unwrap_err();
    assert_eq!(err.kind(), "network");
}

#[tokio::test]
async fn test_openai_success_and_rate_limit() {
    let base = stub(
        StatusCode::OK,
        r#"{"choices":[{"message":{"role":"assistant","content":"Be transparent."},"finish_reason":"stop"}]}"#,
    )
    .await;
    let client = OpenAiClient::from_config(&config(base)).unwrap();
    let completion = client.complete(request()).await.unwrap();
    assert_eq!(completion.text, "Be transparent.");
    assert_eq!(completion.stop_reason.as_deref(), Some("stop"));

    let base = stub(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
    )
    .await;
    let client = OpenAiClient::from_config(&config(base)).unwrap();
    let err = client.complete(request()).await.unwrap_err();
    assert_eq!(err, CompletionError::RateLimit("Rate limit reached".into()));
}

#[tokio::test]
async fn test_openai_empty_choices_is_malformed() {
    let base = stub(StatusCode::OK, r#"{"choices":[]}"#).await;
    let client = OpenAiClient::from_config(&config(base)).unwrap();
    let err = client.complete(request()).await.unwrap_err();
    assert_eq!(err.kind(), "malformed_response");
}
