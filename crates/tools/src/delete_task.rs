//! Delete a single task.

use crate::resolve::{not_found, resolve_task};
use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::UserId;
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct DeleteTaskTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl DeleteTaskTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

#[async_trait]
impl Tool for DeleteTaskTool {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn description(&self) -> &str {
        "Delete a task"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": {
                    "type": "string",
                    "description": "The ID of the task to delete (can be the task title if ID is unknown)"
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
            tool_name: "delete_task".into(),
            reason: e.to_string(),
        };

        let Some(task) = resolve_task(self.store.as_ref(), &self.owner, reference)
            .await
            .map_err(exec_err)?
        else {
            return Ok(ToolOutcome::fail(not_found(reference)));
        };

        self.store
            .delete(task.id, &self.owner)
            .await
            .map_err(exec_err)?;

        Ok(ToolOutcome::ok_with_data(
            format!("Done! I've removed '{}' from your list 🗑️", task.title),
            serde_json::json!({ "task_id": task.id }),
        ))
    }
}
