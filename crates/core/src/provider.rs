//! The LLM transport abstraction.
//!
//! The orchestrator never talks HTTP; it hands a [`CompletionRequest`]
//! to whatever [`Provider`] was injected and gets a
//! [`CompletionResponse`] back. Circuit breaking and deadlines are the
//! orchestrator's job, so implementations stay plain wire clients.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything one completion call needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier understood by the provider (e.g. "openai/gpt-4o-mini").
    pub model: String,

    /// System prompt, history, and the new user message, in order.
    pub messages: Vec<Message>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// The tool catalogue advertised to the model. A non-empty
    /// catalogue is sent with `tool_choice: "auto"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    /// This request again, minus the tool catalogue. Used for the
    /// single downgrade retry after a model refuses tool calling.
    pub fn without_tools(&self) -> Self {
        Self {
            tools: Vec::new(),
            ..self.clone()
        }
    }
}

/// How a tool is described to the model: name, purpose, and a JSON
/// Schema for its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// What came back from one completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assistant message: text, tool directives, or both.
    pub message: Message,

    pub usage: Option<Usage>,

    /// The model that actually answered. Routed providers may
    /// substitute a different one than was requested.
    pub model: String,
}

/// Token accounting as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// An LLM backend capable of chat completion.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name for logs ("openrouter", "scripted", ...).
    fn name(&self) -> &str;

    /// Run one completion call to the backend.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Whether the backend is reachable at all.
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
