//! Mark a task as completed.

use crate::resolve::{not_found, resolve_task};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{TaskStatus, UserId};
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct CompleteTaskTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl CompleteTaskTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

#[async_trait]
impl Tool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn description(&self) -> &str {
        "Mark a task as completed"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the task to complete (can be the task title if ID is unknown)"
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
            tool_name: "complete_task".into(),
            reason: e.to_string(),
        };

        let Some(mut task) = resolve_task(self.store.as_ref(), &self.owner, reference)
            .await
            .map_err(exec_err)?
        else {
            return Ok(ToolOutcome::fail(not_found(reference)));
        };

        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        let task = self.store.update(task).await.map_err(exec_err)?;

        Ok(ToolOutcome::ok_with_data(
            format!("Great job! I've marked '{}' as completed ✅", task.title),
            serde_json::json!({ "task_id": task.id }),
        ))
    }
}
