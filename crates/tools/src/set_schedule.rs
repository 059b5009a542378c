//! Set or update a task's due date.
//!
//! Registered under two names, `set_task_schedule` and `set_task_date`,
//! because deployed models learned to call both.

use crate::dates;
use crate::resolve::{not_found, resolve_task};
use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::UserId;
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct SetScheduleTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
    name: &'static str,
}

impl SetScheduleTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId, name: &'static str) -> Self {
        Self { store, owner, name }
    }
}

#[async_trait]
impl Tool for SetScheduleTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Set or update the schedule/due date for a specific task"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the task to update (can be the task title if ID is unknown)"
                },
                "due_date": {
                    "type": "string",
                    "description": "The due date in ISO format (YYYY-MM-DD) or natural language (e.g. 'Feb 23, 2026')"
                }
            },
            "required": ["task_id", "due_date"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError> {
        let reference = arguments["task_id"].as_str().unwrap_or_default();
        let due_text = arguments["due_date"].as_str().unwrap_or_default();
        let exec_err = |e: taskmind_core::error::StoreError| ToolError::ExecutionFailed {
            tool_name: "set_task_schedule".into(),
            reason: e.to_string(),
        };

        let Some(mut task) = resolve_task(self.store.as_ref(), &self.owner, reference)
            .await
            .map_err(exec_err)?
        else {
            return Ok(ToolOutcome::fail(not_found(reference)));
        };

        let parsed = dates::parse_date(due_text);
        task.due_date = parsed.map(|dt| dt.and_utc());
        let task = self.store.update(task).await.map_err(exec_err)?;

        match parsed {
            Some(due) => Ok(ToolOutcome::ok_with_data(
                format!(
                    "Done! I've scheduled your task '{}' for {} 📅",
                    task.title,
                    due.format("%b %d, %Y")
                ),
                serde_json::json!({ "task_id": task.id }),
            )),
            None => Ok(ToolOutcome::ok_with_data(
                format!(
                    "Sorry, I couldn't understand the date for task '{}'. Could you try a different format?",
                    task.title
                ),
                serde_json::json!({ "task_id": task.id }),
            )),
        }
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
    async fn schedules_task_with_parsed_date() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "gym")).await.unwrap();

        let tool = SetScheduleTool::new(store.clone(), owner(), "set_task_schedule");
        let outcome = tool
            .execute(serde_json::json!({"task_id": "gym", "due_date": "23 Feb 2026"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.message.unwrap().contains("Feb 23, 2026"));

        let task = store.find_by_title("gym", &owner()).await.unwrap().unwrap();
        assert_eq!(task.due_date.unwrap().date_naive().to_string(), "2026-02-23");
    }

    #[tokio::test]
    async fn unparseable_date_clears_due_date_and_apologizes() {
        let store = Arc::new(InMemoryTaskStore::new());
        let mut task = Task::new(owner(), "gym");
        task.due_date = Some(chrono::Utc::now());
        store.create(task).await.unwrap();

        let tool = SetScheduleTool::new(store.clone(), owner(), "set_task_schedule");
        let outcome = tool
            .execute(serde_json::json!({"task_id": "gym", "due_date": "whenever"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.message.unwrap().contains("couldn't understand the date"));
        let task = store.find_by_title("gym", &owner()).await.unwrap().unwrap();
        assert!(task.due_date.is_none());
    }

    #[tokio::test]
    async fn unknown_task_fails() {
        let store = Arc::new(InMemoryTaskStore::new());
        let tool = SetScheduleTool::new(store, owner(), "set_task_date");
        let outcome = tool
            .execute(serde_json::json!({"task_id": "phantom", "due_date": "2026-02-23"}))
            .await
            .unwrap();
        assert!(!outcome.success);
    }
}
