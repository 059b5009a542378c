//! Delete every task the user owns.

use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::UserId;
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct DeleteAllTasksTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl DeleteAllTasksTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

#[async_trait]
impl Tool for DeleteAllTasksTool {
    fn name(&self) -> &str {
        "delete_all_tasks"
    }

    fn description(&self) -> &str {
        "Delete all tasks for the current user"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError> {
        let deleted = self
            .store
            .delete_all(&self.owner)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "delete_all_tasks".into(),
                reason: e.to_string(),
            })?;

        let message = if deleted > 0 {
            format!("I've deleted all {deleted} of your tasks 🗑️")
        } else {
            "I checked your database and couldn't find any tasks to delete.".to_string()
        };

        Ok(ToolOutcome::ok_with_data(
            message,
            serde_json::json!({ "deleted_count": deleted }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmind_core::task::{Task, TaskFilter};
    use taskmind_store::InMemoryTaskStore;

    fn owner() -> UserId {
        UserId::from("u1")
    }

    #[tokio::test]
    async fn deletes_only_own_tasks() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "a")).await.unwrap();
        store.create(Task::new(owner(), "b")).await.unwrap();
        let stranger = UserId::from("u2");
        store.create(Task::new(stranger.clone(), "c")).await.unwrap();

        let tool = DeleteAllTasksTool::new(store.clone(), owner());
        let outcome = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(outcome.success);
        assert!(outcome.message.unwrap().contains("all 2"));
        assert_eq!(
            store.list(&stranger, &TaskFilter::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn empty_store_reports_nothing_to_delete() {
        let store = Arc::new(InMemoryTaskStore::new());
        let tool = DeleteAllTasksTool::new(store, owner());
        let outcome = tool.execute(serde_json::json!({})).await.unwrap();

        assert!(outcome.success);
        assert!(outcome
            .message
            .unwrap()
            .contains("couldn't find any tasks to delete"));
        assert_eq!(outcome.data.unwrap()["deleted_count"], 0);
    }
}
