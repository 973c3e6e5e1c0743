use async_trait::async_trait;
use ethicist_core::CompletionError;

/// Sampling parameters for a single completion.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// Maximum tokens to generate (will be clamped to provider limits)
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.3,
        }
    }
}

impl From<&ethicist_core::config::LlmConfig> for CompletionParams {
    fn from(cfg: &ethicist_core::config::LlmConfig) -> Self {
        Self {
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature.clamp(0.0, 2.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Role-setting preamble.
    pub system: String,
    /// Rendered user prompt.
    pub prompt: String,
    pub params: CompletionParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub stop_reason: Option<String>,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round trip to the provider. Implementations must not retry.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
