//! Update an existing task.

use crate::dates;
use crate::resolve::{not_found, resolve_task};
use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{TaskPriority, TaskStatus, UserId};
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct UpdateTaskTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl UpdateTaskTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

#[async_trait]
impl Tool for UpdateTaskTool {
    fn name(&self) -> &str {
        "update_task"
    }

    fn description(&self) -> &str {
        "Update an existing task with new information"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the task to update (can be the task title if ID is unknown)"
                },
                "title": {
                    "type": "string",
                    "description": "The new title of the task"
                },
                "description": {
                    "type": "string",
                    "description": "The new description of the task"
                },
                "status": {
                    "type": "string",
                    "enum": ["pending", "in-progress", "completed", "cancelled"],
                    "description": "The new status of the task"
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "urgent"],
                    "description": "The new priority of the task"
                },
                "due_date": {
                    "type": "string",
                    "description": "The new due date in ISO format (YYYY-MM-DD) or natural language"
                }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError> {
        let reference = arguments["task_id"].as_str().unwrap_or_default();
        let exec_err = |e: taskmind_core::error::StoreError| ToolError::ExecutionFailed {
            tool_name: "update_task".into(),
            reason: e.to_string(),
        };

        let Some(mut task) = resolve_task(self.store.as_ref(), &self.owner, reference)
            .await
            .map_err(exec_err)?
        else {
            return Ok(ToolOutcome::fail(not_found(reference)));
        };

        if let Some(title) = arguments["title"].as_str() {
            task.title = title.to_string();
        }
        if let Some(description) = arguments["description"].as_str() {
            task.description = Some(description.to_string());
        }
        if let Some(status) = arguments["status"].as_str().and_then(TaskStatus::parse) {
            task.status = status;
        }
        if let Some(priority) = arguments["priority"].as_str().and_then(TaskPriority::parse) {
            task.priority = priority;
        }
        if let Some(due) = arguments["due_date"].as_str() {
            task.due_date = dates::parse_date(due).map(|dt| dt.and_utc());
        }

        let task = self.store.update(task).await.map_err(exec_err)?;

        Ok(ToolOutcome::ok_with_data(
            format!("Perfect! I've updated your task to '{}' 📝", task.title),
            serde_json::json!({ "task_id": task.id, "task": task }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmind_core::task::Task;
    use taskmind_store::InMemoryTaskStore;

    fn owner() -> UserId {
        UserId::from("u1")
    }

    #[tokio::test]
    async fn updates_by_title_reference() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "crocery")).await.unwrap();

        let tool = UpdateTaskTool::new(store.clone(), owner());
        let outcome = tool
            .execute(serde_json::json!({
                "task_id": "crocery",
                "title": "shopping",
                "description": "cloths"
            }))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.message.unwrap().contains("shopping"));

        let task = store.find_by_title("shopping", &owner()).await.unwrap().unwrap();
        assert_eq!(task.description.as_deref(), Some("cloths"));
    }

    #[tokio::test]
    async fn unknown_task_returns_error_outcome() {
        let store = Arc::new(InMemoryTaskStore::new());
        let tool = UpdateTaskTool::new(store, owner());
        let outcome = tool
            .execute(serde_json::json!({"task_id": "phantom", "title": "x"}))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("phantom"));
    }

    #[tokio::test]
    async fn updates_status_and_priority() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "deploy")).await.unwrap();

        let tool = UpdateTaskTool::new(store.clone(), owner());
        tool.execute(serde_json::json!({
            "task_id": "deploy",
            "status": "in-progress",
            "priority": "high"
        }))
        .await
        .unwrap();

        let task = store.find_by_title("deploy", &owner()).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
    }
}
