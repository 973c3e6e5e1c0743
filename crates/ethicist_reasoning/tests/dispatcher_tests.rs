//! Integration tests for the ToolDispatcher.
//!
//! A SpyClient records every request and replays queued outcomes, so the
//! whole call_tool pipeline runs without network access.

use async_trait::async_trait;
use ethicist_core::{CompletionError, EthicistError};
use ethicist_reasoning::llm::{Completion, CompletionClient, CompletionParams, CompletionRequest};
use ethicist_reasoning::ToolDispatcher;
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Mutex;

// ============================================================================
// Spy client
// ============================================================================

struct SpyClient {
    outcomes: Mutex<Vec<Result<Completion, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicUsize,
}

impl SpyClient {
    fn new(outcomes: Vec<Result<Completion, CompletionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

fn text(s: &str) -> Result<Completion, CompletionError> {
    Ok(Completion {
        text: s.to_string(),
        stop_reason: Some("end_turn".into()),
    })
}

#[async_trait]
impl CompletionClient for SpyClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);
        let mut queue = self.outcomes.lock().await;
        if queue.is_empty() {
            text("default answer")
        } else {
            queue.remove(0)
        }
    }

    fn model(&self) -> &str {
        "spy"
    }
}

fn dispatcher(spy: &Arc<SpyClient>) -> ToolDispatcher {
    ToolDispatcher::new(spy.clone(), CompletionParams::default())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_tool_never_calls_client() {
    let spy = Arc::new(SpyClient::new(vec![]));
    let err = dispatcher(&spy)
        .call_tool("nonexistent_tool", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err, EthicistError::UnknownTool("nonexistent_tool".into()));
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_missing_required_argument_never_calls_client() {
    let spy = Arc::new(SpyClient::new(vec![]));
    let err = dispatcher(&spy)
        .call_tool("analyze_ethical_scenario", &json!({}))
        .await
        .unwrap_err();
    match err {
        EthicistError::InvalidArgument { field, .. } => assert_eq!(field, "scenario"),
        other => panic!("Expected InvalidArgument, got {:?}", other),
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_then_recovery() {
    let spy = Arc::new(SpyClient::new(vec![
        Err(CompletionError::RateLimit("slow down".into())),
        text("Selection bias is likely."),
    ]));
    let d = dispatcher(&spy);
    let args = json!({
        "context": "training data from one hospital",
        "bias_types": ["selection", "representation"]
    });

    let err = d.call_tool("check_bias", &args).await.unwrap_err();
    assert_eq!(
        err,
        EthicistError::CompletionFailed(CompletionError::RateLimit("slow down".into()))
    );
    assert_eq!(err.kind(), "completion_failed");

    let result = d.call_tool("check_bias", &args).await.unwrap();
    assert_eq!(result.content.len(), 2);
    assert!(result.joined_text().starts_with("Selection bias is likely."));
    assert!(result.joined_text().contains("Representation"));
    assert_eq!(spy.calls(), 2);
}

#[tokio::test]
async fn test_request_carries_system_instruction_and_params() {
    let spy = Arc::new(SpyClient::new(vec![]));
    let params = CompletionParams {
        max_tokens: 512,
        temperature: 0.0,
    };
    let d = ToolDispatcher::new(spy.clone(), params);
    d.call_tool(
        "generate_ethical_guidelines",
        &json!({"project_type": "finance", "regulations": ["GDPR", "SOX"]}),
    )
    .await
    .unwrap();

    let requests = spy.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req.system.contains("AI governance advisor"));
    assert!(req.prompt.contains("Project type: finance\n"));
    assert!(req.prompt.contains("Risk level: medium\n"));
    assert!(req.prompt.contains("Applicable regulations: GDPR, SOX\n"));
    assert_eq!(req.params.max_tokens, 512);
}

#[tokio::test]
async fn test_failure_has_no_fallback_text() {
    let spy = Arc::new(SpyClient::new(vec![Err(CompletionError::MalformedResponse(
        "no text".into(),
    ))]));
    let result = dispatcher(&spy)
        .call_tool("assess_transparency", &json!({"system_type": "LLM"}))
        .await;
    assert!(matches!(
        result,
        Err(EthicistError::CompletionFailed(CompletionError::MalformedResponse(_)))
    ));
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let spy = Arc::new(SpyClient::new(vec![]));
    let d = Arc::new(dispatcher(&spy));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let d = d.clone();
            tokio::spawn(async move {
                d.call_tool(
                    "analyze_ethical_scenario",
                    &json!({"scenario": format!("case {}", i), "frameworks": ["care"]}),
                )
                .await
            })
        })
        .collect();

    for h in handles {
        assert!(h.await.unwrap().is_ok());
    }
    assert_eq!(spy.calls(), 8);
}
