//! Task reference resolution shared by the task-identifying tools.

use taskmind_core::error::StoreError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{Task, UserId};
use uuid::Uuid;

/// Resolve a `task_id` argument to a task.
///
/// The reference is tried as a UUID first; anything else (or a UUID that
/// matches nothing) falls back to an exact-title lookup scoped to the
/// owner. Duplicate titles resolve to the most recently updated task
/// (the store's `find_by_title` contract).
pub(crate) async fn resolve_task(
    store: &dyn TaskStore,
    owner: &UserId,
    reference: &str,
) -> Result<Option<Task>, StoreError> {
    if let Ok(id) = Uuid::parse_str(reference) {
        if let Some(task) = store.get(id, owner).await? {
            return Ok(Some(task));
        }
    }
    store.find_by_title(reference, owner).await
}

/// The user-facing text for an unresolvable task reference.
pub(crate) fn not_found(reference: &str) -> String {
    format!("⚠ I couldn't find the task '{reference}' in your database.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskmind_store::InMemoryTaskStore;

    #[tokio::test]
    async fn resolves_by_uuid() {
        let store = Arc::new(InMemoryTaskStore::new());
        let owner = UserId::from("u1");
        let task = store.create(Task::new(owner.clone(), "gym")).await.unwrap();

        let found = resolve_task(store.as_ref(), &owner, &task.id.to_string())
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, task.id);
    }

    #[tokio::test]
    async fn falls_back_to_title() {
        let store = Arc::new(InMemoryTaskStore::new());
        let owner = UserId::from("u1");
        let task = store.create(Task::new(owner.clone(), "gym")).await.unwrap();

        let found = resolve_task(store.as_ref(), &owner, "gym").await.unwrap();
        assert_eq!(found.unwrap().id, task.id);
    }

    #[tokio::test]
    async fn unknown_reference_is_none() {
        let store = Arc::new(InMemoryTaskStore::new());
        let owner = UserId::from("u1");
        let found = resolve_task(store.as_ref(), &owner, "nonexistent-title")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn title_lookup_is_owner_scoped() {
        let store = Arc::new(InMemoryTaskStore::new());
        let other = UserId::from("u2");
        store.create(Task::new(other, "gym")).await.unwrap();

        let owner = UserId::from("u1");
        let found = resolve_task(store.as_ref(), &owner, "gym").await.unwrap();
        assert!(found.is_none());
    }
}
