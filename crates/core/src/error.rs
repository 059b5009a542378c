//! Error taxonomy, one `thiserror` enum per bounded context.
//!
//! There is deliberately no single catch-all error type: every
//! boundary returns its own enum, and only `AgentError` ever reaches
//! the fallback policy.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider does not support tool calling: {0}")]
    ToolsUnsupported(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Missing required argument for {tool_name}: {argument}")]
    MissingArgument { tool_name: String, argument: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failures surfaced by the agent orchestrator.
///
/// These are the only errors the fallback policy ever sees; everything
/// below the orchestrator is either converted into a structured tool
/// outcome (dispatcher boundary) or mapped into one of these variants.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Circuit breaker is open; provider calls are suspended")]
    CircuitOpen,

    #[error("Model kept requesting tools after {rounds} round(s); aborting turn")]
    MaxToolRounds { rounds: u32 },

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Internal agent error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_status_and_message() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_names_the_missing_argument() {
        let err = ToolError::MissingArgument {
            tool_name: "create_task".into(),
            argument: "title".into(),
        };
        assert!(err.to_string().contains("create_task"));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn agent_error_from_provider() {
        let err = AgentError::from(ProviderError::Timeout("no response after 120s".into()));
        assert!(matches!(err, AgentError::Provider(ProviderError::Timeout(_))));
        assert!(err.to_string().contains("120s"));
    }

    #[test]
    fn max_tool_rounds_message() {
        let err = AgentError::MaxToolRounds { rounds: 1 };
        assert!(err.to_string().contains("1 round"));
    }
}
