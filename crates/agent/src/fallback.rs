//! Fallback policy: failure classification and user-safe text.
//!
//! This is the single place in the system where a failure becomes text
//! a user can see. The raw error is logged with its category and
//! conversation id; the message returned to the caller is only ever one
//! of the configured category texts, never provider detail.

use crate::orchestrator::{AgentReply, ReplyStatus};
use taskmind_core::error::{AgentError, ProviderError};
use taskmind_config::FallbackConfig;
use tracing::error;

/// The categories a failed turn collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Authentication,
    RateLimit,
    Timeout,
    ServiceUnavailable,
    CircuitOpen,
    Unexpected,
}

impl FailureCategory {
    /// Collapse an orchestrator failure into its category.
    pub fn classify(err: &AgentError) -> Self {
        match err {
            AgentError::CircuitOpen => Self::CircuitOpen,
            AgentError::Provider(p) => match p {
                ProviderError::AuthenticationFailed(_) => Self::Authentication,
                ProviderError::RateLimited { .. } => Self::RateLimit,
                ProviderError::Timeout(_) => Self::Timeout,
                ProviderError::Network(_) | ProviderError::NotConfigured(_) => {
                    Self::ServiceUnavailable
                }
                ProviderError::ApiError { status_code, .. } if *status_code >= 500 => {
                    Self::ServiceUnavailable
                }
                _ => Self::Unexpected,
            },
            AgentError::MaxToolRounds { .. }
            | AgentError::Store(_)
            | AgentError::Internal(_) => Self::Unexpected,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "service_unavailable",
            Self::CircuitOpen => "circuit_open",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Maps failure categories to configured user-safe text.
pub struct FallbackPolicy {
    config: FallbackConfig,
}

impl FallbackPolicy {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Convert an orchestrator result into a reply that is always safe
    /// to show the user. Successful replies pass through untouched.
    pub fn recover(&self, result: Result<AgentReply, AgentError>, conversation_id: &str) -> AgentReply {
        match result {
            Ok(reply) => reply,
            Err(err) => {
                let category = FailureCategory::classify(&err);
                error!(
                    conversation_id = %conversation_id,
                    category = category.as_str(),
                    error = %err,
                    "Chat turn failed; returning fallback response"
                );
                AgentReply {
                    text: self.user_text(category),
                    trace: Vec::new(),
                    status: ReplyStatus::Error,
                }
            }
        }
    }

    /// The configured text for a category, or the single default when
    /// no category-specific text is configured.
    pub fn user_text(&self, category: FailureCategory) -> String {
        let specific = match category {
            FailureCategory::Authentication => &self.config.authentication,
            FailureCategory::RateLimit => &self.config.rate_limit,
            FailureCategory::Timeout => &self.config.timeout,
            FailureCategory::ServiceUnavailable => &self.config.service_unavailable,
            FailureCategory::CircuitOpen => &self.config.circuit_open,
            FailureCategory::Unexpected => &self.config.unexpected,
        };
        specific.clone().unwrap_or_else(|| self.config.default.clone())
    }
}
