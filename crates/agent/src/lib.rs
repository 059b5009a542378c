//! Agent orchestration for taskmind.
//!
//! This crate is the heart of the system: it turns a user's free-text
//! message into store actions through the two-phase tool-calling
//! protocol and guarantees that what the user is told matches what the
//! store actually did.
//!
//! - [`context`] — per-conversation message history with TTL caching
//!   and token-budget truncation
//! - [`orchestrator`] — builds LLM requests, negotiates tool calls
//!   through the circuit breaker, grounds the final reply in tool
//!   results
//! - [`fallback`] — classifies failures and produces the only
//!   user-visible failure text in the system

pub mod context;
pub mod fallback;
pub mod orchestrator;
pub mod prompt;

pub use context::cache::ContextCache;
pub use fallback::{FailureCategory, FallbackPolicy};
pub use orchestrator::{AgentOrchestrator, AgentReply, ReplyStatus, ToolInvocation};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
