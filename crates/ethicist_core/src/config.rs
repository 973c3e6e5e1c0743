use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EthicistConfig {
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

impl EthicistConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: EthicistConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key/value source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ETHICIST_PROVIDER") {
            self.llm.provider = v;
        }
        if let Some(v) = lookup("ETHICIST_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("ETHICIST_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Some(n) = lookup("ETHICIST_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = n;
        }
        if let Some(n) = lookup("ETHICIST_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = n;
        }
        if let Some(n) = lookup("ETHICIST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.llm.timeout_secs = n;
        }
        if let Some(level) = lookup("ETHICIST_LOG_LEVEL").and_then(|v| LogLevel::parse(&v)) {
            self.logging.level = level;
        }
        if let Some(v) = lookup("ETHICIST_HOST") {
            self.server.host = v;
        }
        if let Some(n) = lookup("ETHICIST_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = n;
        }

        // The credential is never part of the TOML file.
        let key_var = self.llm.credential_env_var();
        self.llm.api_key = lookup("ETHICIST_API_KEY")
            .or_else(|| lookup(key_var))
            .filter(|k| !k.trim().is_empty());
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for a single completion round trip.
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl LlmConfig {
    /// Environment variable conventionally holding this provider's key.
    pub fn credential_env_var(&self) -> &'static str {
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "ANTHROPIC_API_KEY",
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: None,
            max_tokens: 2048,
            temperature: 0.3,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

// Keeps the credential out of debug logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
