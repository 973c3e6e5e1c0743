use super::{classify_status, classify_transport, http_client, truncate};
use crate::llm::{Completion, CompletionClient, CompletionRequest};
use anyhow::Result;
use ethicist_core::config::LlmConfig;
use ethicist_core::CompletionError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
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

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    #[tracing::instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential {
                env_var: "OPENAI_API_KEY".to_string(),
            })?;

        // System prompt goes first as its own message
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.params.max_tokens,
            temperature: request.params.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            tracing::warn!("OpenAI-compatible endpoint returned {}", status);
            return Err(classify_status(status, &text));
        }
        tracing::debug!("OpenAI raw response: {}", truncate(&text, 2000));

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            CompletionError::MalformedResponse(format!("Failed to parse OpenAI response: {}", e))
        })?;
        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            CompletionError::MalformedResponse("response contained no choices".to_string())
        })?;
        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                CompletionError::MalformedResponse("response contained no text content".to_string())
            })?;

        Ok(Completion {
            text: content,
            stop_reason: choice.finish_reason,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
