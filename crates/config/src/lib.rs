//! Configuration for taskmind.
//!
//! Settings come from a `taskmind.toml` file, topped up with
//! environment-variable overrides for the values deployments prefer to
//! inject (API key, model). Everything is validated once at startup,
//! and the API key is kept out of Debug output.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root of `taskmind.toml`. Every section is optional; missing values
/// fall back to the serde defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Agent orchestration settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation context cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Circuit breaker settings
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// User-facing fallback texts per failure category
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings for the outbound LLM provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (e.g. "openrouter", "openai", "ollama")
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (usually supplied via environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_provider_name() -> String {
    "openrouter".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
        }
    }
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match &self.api_key {
            Some(_) => "[REDACTED]",
            None => "None",
        };
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &key)
            .finish()
    }
}

/// Settings for the agent orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Override the built-in system instruction entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per LLM response
    #[serde(default = "default_max_response_tokens")]
    pub max_response_tokens: u32,

    /// Token budget for the conversation history sent to the LLM
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// Hard cap on tool-call rounds per turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Deadline for each outbound LLM call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_max_response_tokens() -> u32 {
    1000
}
fn default_max_context_tokens() -> usize {
    4000
}
fn default_max_tool_rounds() -> u32 {
    1
}
fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt_override: None,
            temperature: default_temperature(),
            max_response_tokens: default_max_response_tokens(),
            max_context_tokens: default_max_context_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Settings for the conversation context cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached conversation context stays valid
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Settings for the circuit breaker guarding the LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds to wait before allowing a recovery trial call
    #[serde(default = "default_recovery_timeout_secs")]
    pub recovery_timeout_secs: u64,
}

fn default_failure_threshold() -> u32 {
    3
}
fn default_recovery_timeout_secs() -> u64 {
    30
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout_secs(),
        }
    }
}

/// User-facing texts returned when a turn fails.
///
/// Each field overrides the message for one failure category; `default`
/// covers any category without a specific text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_response")]
    pub default: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_unavailable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_open: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected: Option<String>,
}

fn default_fallback_response() -> String {
    "I'm having trouble responding right now. Could you try rephrasing?".into()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            default: default_fallback_response(),
            authentication: None,
            rate_limit: None,
            timeout: None,
            service_unavailable: None,
            circuit_open: None,
            unexpected: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Apply environment variable overrides on top of file settings.
    ///
    /// The API key may come from `TASKMIND_API_KEY`, or from the
    /// `OPENROUTER_API_KEY`/`OPENAI_API_KEY` names other tooling
    /// already sets; `TASKMIND_MODEL` and `TASKMIND_PROVIDER` override
    /// the corresponding file values.
    pub fn apply_env_overrides(&mut self) {
        if self.provider.api_key.is_none() {
            self.provider.api_key = std::env::var("TASKMIND_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("TASKMIND_MODEL") {
            self.provider.model = model;
        }

        if let Ok(provider) = std::env::var("TASKMIND_PROVIDER") {
            self.provider.name = provider;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.temperature < 0.0 || self.agent.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "agent.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_tool_rounds must be at least 1".into(),
            ));
        }

        if self.breaker.failure_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "breaker.failure_threshold must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
