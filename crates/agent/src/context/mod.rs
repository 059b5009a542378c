//! Conversation context: TTL caching and token-budget shaping.

pub mod cache;
pub mod token;

pub use cache::ContextCache;
pub use token::{estimate_message_tokens, estimate_tokens, truncate};
