//! In-memory backends — useful for testing and single-process deployments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use taskmind_core::error::StoreError;
use taskmind_core::message::{ConversationId, Message};
use taskmind_core::store::{ConversationStore, TaskStore};
use taskmind_core::task::{Task, TaskFilter, TaskStatus, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A task store backed by a map guarded by a single RwLock.
///
/// Every operation takes the owner id; a task belonging to another
/// user is indistinguishable from a task that does not exist.
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: Uuid, owner: &UserId) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| &t.owner == owner).cloned())
    }

    async fn find_by_title(&self, title: &str, owner: &UserId) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        // Duplicate titles resolve to the most recently updated task.
        Ok(tasks
            .values()
            .filter(|t| &t.owner == owner && t.title == title)
            .max_by_key(|t| t.updated_at)
            .cloned())
    }

    async fn update(&self, mut task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&task.id) {
            Some(existing) if existing.owner == task.owner => {
                task.updated_at = Utc::now();
                tasks.insert(task.id, task.clone());
                Ok(task)
            }
            _ => Err(StoreError::TaskNotFound(task.id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid, owner: &UserId) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(existing) if &existing.owner == owner => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_all(&self, owner: &UserId) -> Result<usize, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| &t.owner != owner);
        Ok(before - tasks.len())
    }

    async fn list(&self, owner: &UserId, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let now = Utc::now();
        let tasks = self.tasks.read().await;
        let mut matched: Vec<Task> = tasks
            .values()
            .filter(|t| &t.owner == owner && filter.matches(t, now))
            .cloned()
            .collect();
        matched.sort_by_key(|t| t.created_at);
        Ok(matched)
    }

    async fn counts_by_status(
        &self,
        owner: &UserId,
    ) -> Result<HashMap<TaskStatus, usize>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut counts = HashMap::new();
        for task in tasks.values().filter(|t| &t.owner == owner) {
            *counts.entry(task.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Append-only conversation history in a map guarded by a single RwLock.
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<ConversationId, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(id).cloned().unwrap_or_default())
    }

    async fn append(&self, id: &ConversationId, message: Message) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        conversations.entry(id.clone()).or_default().push(message);
        Ok(())
    }
}
