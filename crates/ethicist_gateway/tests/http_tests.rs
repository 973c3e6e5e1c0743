//! Router tests for the HTTP transport, driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ethicist_gateway::GatewayServer;
use ethicist_mcp::McpServer;
use ethicist_reasoning::providers::MockProvider;
use ethicist_reasoning::{CompletionParams, ToolDispatcher};
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router() -> Router {
    let server = McpServer::new(ToolDispatcher::new(
        Arc::new(MockProvider::new("echo")),
        CompletionParams::default(),
    ));
    GatewayServer::new(server, "127.0.0.1", 0).router()
}

async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Read SSE frames until one carries `event: {name}`; returns its data line.
async fn next_event<S>(stream: &mut S, name: &str) -> String
where
    S: futures_util::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
{
    let mut buf = String::new();
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for SSE event")
            .expect("stream ended")
            .unwrap();
        buf.push_str(std::str::from_utf8(&chunk).unwrap());
        while let Some(end) = buf.find("\n\n") {
            let frame: String = buf.drain(..end + 2).collect();
            if frame.lines().any(|l| l == format!("event: {}", name)) {
                return frame
                    .lines()
                    .filter_map(|l| l.strip_prefix("data: "))
                    .collect::<Vec<_>>()
                    .join("\n");
            }
        }
    }
}

#[tokio::test]
async fn test_health() {
    let resp = router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp.into_body()).await, "ok");
}

#[tokio::test]
async fn test_mcp_post_returns_response_in_body() {
    let req = post(
        "/mcp",
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string(),
    );
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(resp.into_body()).await).unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["tools"][0]["name"], "analyze_ethical_scenario");
}

#[tokio::test]
async fn test_mcp_post_parse_error_and_notification() {
    let resp = router().oneshot(post("/mcp", "{oops".into())).await.unwrap();
    let body: Value = serde_json::from_str(&body_string(resp.into_body()).await).unwrap();
    assert_eq!(body["error"]["code"], -32700);

    let resp = router()
        .oneshot(post(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_sse_content_type() {
    let resp = router()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/event-stream"));
}

#[tokio::test]
async fn test_messages_unknown_session() {
    let uri = format!("/messages?session_id={}", uuid_like());
    let resp = router()
        .oneshot(post(&uri, json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_malformed_session_id() {
    let resp = router()
        .oneshot(post("/messages?session_id=not-a-uuid", "{}".into()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sse_session_round_trip() {
    let app = router();
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut events = resp.into_body().into_data_stream();

    let endpoint = next_event(&mut events, "endpoint").await;
    assert!(endpoint.starts_with("/messages?session_id="));

    let req = post(
        &endpoint,
        json!({"jsonrpc": "2.0", "id": 42, "method": "resources/read",
               "params": {"uri": "ethicist://guidelines/ai-ethics"}})
        .to_string(),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let data = next_event(&mut events, "message").await;
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(message["id"], 42);
    assert!(message["result"]["contents"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("# AI Ethics Guidelines"));
}

fn uuid_like() -> &'static str {
    "00000000-0000-4000-8000-000000000000"
}
