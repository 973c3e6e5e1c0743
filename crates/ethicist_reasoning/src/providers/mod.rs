pub mod anthropic;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use mock::MockProvider;
pub use openai::OpenAiClient;

use crate::api_types::ApiErrorBody;
use crate::llm::CompletionClient;
use anyhow::{bail, Result};
use ethicist_core::config::LlmConfig;
use ethicist_core::CompletionError;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Build the completion client named by `llm.provider`.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>> {
    let client: Arc<dyn CompletionClient> = match config.provider.as_str() {
        "anthropic" => Arc::new(AnthropicClient::from_config(config)?),
        "openai" => Arc::new(OpenAiClient::from_config(config)?),
        "mock" => Arc::new(MockProvider::new(&config.model)),
        other => bail!(
            "Unknown LLM provider '{}' (expected anthropic, openai or mock)",
            other
        ),
    };
    tracing::info!(
        "Completion provider: {} (model {})",
        config.provider,
        config.model
    );
    Ok(client)
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()?)
}

/// Map a non-success HTTP status and its body onto the error taxonomy.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| truncate(body, 500).to_string());
    match status.as_u16() {
        401 | 403 => CompletionError::Authentication(message),
        429 => CompletionError::RateLimit(message),
        code => CompletionError::Api {
            status: code,
            message,
        },
    }
}

pub(crate) fn classify_transport(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Network(format!("request timed out: {}", err))
    } else {
        CompletionError::Network(err.to_string())
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        let body = r#"{"error": {"type": "rate_limit_error", "message": "slow down"}}"#;
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, body),
            CompletionError::RateLimit("slow down".into())
        );
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "nope"),
            CompletionError::Authentication(ref m) if m == "nope"
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, ""),
            CompletionError::Authentication(_)
        ));
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            CompletionError::Api {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let cfg = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..Default::default()
        };
        let err = create_client(&cfg).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_create_client_mock() {
        let cfg = LlmConfig {
            provider: "mock".into(),
            model: "echo".into(),
            ..Default::default()
        };
        let client = create_client(&cfg).unwrap();
        assert_eq!(client.model(), "echo");
    }
}
