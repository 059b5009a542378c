//! Conversation identity and message types.
//!
//! A conversation is an append-only sequence of messages. Once a
//! message is in the history it is never edited; a turn only ever adds
//! to the tail. The assistant's messages may embed tool directives,
//! and each tool result is appended as its own `Role::Tool` message
//! correlated back to the directive that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// A fresh random id for a brand-new conversation.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standing instructions placed at the head of every request.
    System,
    /// The person chatting with the agent.
    User,
    /// The model's side of the conversation.
    Assistant,
    /// The structured result of one executed tool directive.
    Tool,
}

/// One entry in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,

    /// Directives the assistant asked to have executed. Empty for
    /// every role except `Assistant`, and usually for that too.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolDirective>,

    /// For `Role::Tool` messages: which directive this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// A tool result correlated to the directive it answers.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }
}

/// A tool invocation the model asked for, as it came off the wire.
///
/// `arguments` stays a raw JSON string here. Models emit malformed
/// argument payloads often enough that parsing belongs at the dispatch
/// boundary, where a failure can become a structured outcome instead
/// of a dropped turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDirective {
    /// Correlation id assigned by the provider.
    pub id: String,
    /// Which registered tool to run.
    pub name: String,
    /// Raw JSON object of named arguments.
    pub arguments: String,
}
