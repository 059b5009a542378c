//! Store backends for taskmind.
//!
//! Implementations of the `TaskStore` and `ConversationStore` traits
//! from `taskmind-core`. The in-memory backend keeps the whole system
//! exercisable end-to-end without an external database.

pub mod in_memory;

pub use in_memory::{InMemoryConversationStore, InMemoryTaskStore};
