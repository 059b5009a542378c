//! Store traits — the persistence collaborators of the agent subsystem.
//!
//! Backends live in `taskmind-store`. Every task query takes the owner
//! id as part of its signature: there is no way to express a cross-user
//! lookup through this interface.

use crate::error::StoreError;
use crate::message::{ConversationId, Message};
use crate::task::{Task, TaskFilter, TaskStatus, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// CRUD access to the task store.
///
/// Each mutation commits immediately and independently; there is no
/// transactional grouping across calls.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new task.
    async fn create(&self, task: Task) -> Result<Task, StoreError>;

    /// Fetch a task by id, scoped to its owner.
    async fn get(&self, id: Uuid, owner: &UserId) -> Result<Option<Task>, StoreError>;

    /// Fetch a task by exact title, scoped to its owner.
    ///
    /// When several tasks share the title, the most recently updated
    /// one wins.
    async fn find_by_title(&self, title: &str, owner: &UserId) -> Result<Option<Task>, StoreError>;

    /// Overwrite an existing task. Fails if the task does not exist
    /// under the given owner.
    async fn update(&self, task: Task) -> Result<Task, StoreError>;

    /// Delete a task by id. Returns whether anything was removed.
    async fn delete(&self, id: Uuid, owner: &UserId) -> Result<bool, StoreError>;

    /// Delete every task of the given owner. Returns the count removed.
    async fn delete_all(&self, owner: &UserId) -> Result<usize, StoreError>;

    /// List tasks matching the filter, oldest first.
    async fn list(&self, owner: &UserId, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Count tasks per status for the owner.
    async fn counts_by_status(
        &self,
        owner: &UserId,
    ) -> Result<HashMap<TaskStatus, usize>, StoreError>;
}

/// Append-only message history per conversation.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the full message history, oldest first. An unknown
    /// conversation is an empty history, not an error.
    async fn load(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError>;

    /// Append a message to the conversation.
    async fn append(&self, id: &ConversationId, message: Message) -> Result<(), StoreError>;
}
