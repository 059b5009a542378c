//! Create a new task.

use crate::dates;
use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{Task, TaskPriority, UserId};
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct CreateTaskTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl CreateTaskTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

#[async_trait]
impl Tool for CreateTaskTool {
    fn name(&self) -> &str {
        "create_task"
    }

    fn description(&self) -> &str {
        "Create a new task with a title and optional description, priority, and due date"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The title of the task"
                },
                "description": {
                    "type": "string",
                    "description": "The description of the task"
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "urgent"],
                    "description": "The priority of the task",
                    "default": "medium"
                },
                "due_date": {
                    "type": "string",
                    "description": "The due date in ISO format (YYYY-MM-DD) or natural language (e.g. 'Feb 23, 2026')"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError> {
        let title = arguments["title"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'title' must be a string".into()))?
            .trim()
            .to_string();

        let mut task = Task::new(self.owner.clone(), title);
        if let Some(description) = arguments["description"].as_str() {
            task.description = Some(description.to_string());
        }
        if let Some(priority) = arguments["priority"].as_str() {
            if let Some(parsed) = TaskPriority::parse(priority) {
                task.priority = parsed;
            }
        }
        if let Some(due) = arguments["due_date"].as_str() {
            task.due_date = dates::parse_date(due).map(|dt| dt.and_utc());
        }

        let task = self
            .store
            .create(task)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(ToolOutcome::ok_with_data(
            format!("Got it! I've added your task '{}' to your list 🌟", task.title),
            serde_json::json!({ "task_id": task.id, "task": task }),
        ))
    }
}
