//! Error taxonomy shared by the dispatcher, the registries and the transports.

use thiserror::Error;

/// Failure reported by a completion provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("no API credential configured (set {env_var})")]
    MissingCredential { env_var: String },

    #[error("authentication rejected by provider: {0}")]
    Authentication(String),

    #[error("rate limited by provider: {0}")]
    RateLimit(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

impl CompletionError {
    /// Stable machine-readable label, used in protocol error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::MissingCredential { .. } => "missing_credential",
            CompletionError::Authentication(_) => "authentication",
            CompletionError::RateLimit(_) => "rate_limit",
            CompletionError::Network(_) => "network",
            CompletionError::MalformedResponse(_) => "malformed_response",
            CompletionError::Api { .. } => "api",
        }
    }
}

/// Errors surfaced by tool, resource and prompt operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EthicistError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Completion failed: {0}")]
    CompletionFailed(#[from] CompletionError),

    #[error("Duplicate tool definition: {0}")]
    DuplicateTool(String),
}

impl EthicistError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EthicistError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable label, used in protocol error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            EthicistError::UnknownTool(_) => "unknown_tool",
            EthicistError::UnknownResource(_) => "unknown_resource",
            EthicistError::UnknownPrompt(_) => "unknown_prompt",
            EthicistError::InvalidArgument { .. } => "invalid_argument",
            EthicistError::CompletionFailed(_) => "completion_failed",
            EthicistError::DuplicateTool(_) => "duplicate_tool",
        }
    }
}
