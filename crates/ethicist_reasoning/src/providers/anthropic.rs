use super::{classify_status, classify_transport, http_client, truncate};
use crate::api_types::{Message, MessagesRequest, MessagesResponse};
use crate::llm::{Completion, CompletionClient, CompletionRequest};
use anyhow::Result;
use ethicist_core::config::LlmConfig;
use ethicist_core::CompletionError;
use reqwest::Client;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone(),
        })
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait::async_trait]
impl CompletionClient for AnthropicClient {
    #[tracing::instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential {
                env_var: "ANTHROPIC_API_KEY".to_string(),
            })?;

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: self.model.clone(),
            system: Some(request.system).filter(|s| !s.is_empty()),
            messages: vec![Message::user(request.prompt)],
            max_tokens: request.params.max_tokens,
            temperature: Some(request.params.temperature),
        };

        tracing::debug!(
            "LLM params: max_tokens={}, temperature={:.2}",
            request.params.max_tokens,
            request.params.temperature
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            tracing::warn!("Anthropic returned {}", status);
            return Err(classify_status(status, &text));
        }

        tracing::debug!(
            "Anthropic raw response (first 2000 chars): {}",
            truncate(&text, 2000)
        );
        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            CompletionError::MalformedResponse(format!("Failed to parse Anthropic response: {}", e))
        })?;
        let completion_text = parsed.text().ok_or_else(|| {
            CompletionError::MalformedResponse("response contained no text content".to_string())
        })?;

        Ok(Completion {
            text: completion_text,
            stop_reason: parsed.stop_reason,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
