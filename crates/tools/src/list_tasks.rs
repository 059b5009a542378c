//! List tasks with optional filters.
//!
//! The formatted `message` this tool returns is what the grounding rule
//! promotes into the final reply: the list the user sees always comes
//! from here, never from the model's own narrative.

use crate::dates;
use async_trait::async_trait;
use std::sync::Arc;
use taskmind_core::error::ToolError;
use taskmind_core::store::TaskStore;
use taskmind_core::task::{Task, TaskFilter, TaskPriority, TaskStatus, UserId};
use taskmind_core::tool::{Tool, ToolOutcome};

pub struct ListTasksTool {
    store: Arc<dyn TaskStore>,
    owner: UserId,
}

impl ListTasksTool {
    pub fn new(store: Arc<dyn TaskStore>, owner: UserId) -> Self {
        Self { store, owner }
    }

    /// Build the filter from tool arguments. Unrecognized filter values
    /// are ignored rather than rejected, matching the lenient reading
    /// the model-facing contract promises.
    fn filter_from_args(arguments: &serde_json::Value) -> TaskFilter {
        TaskFilter {
            status: arguments["status"].as_str().and_then(TaskStatus::parse),
            priority: arguments["priority"].as_str().and_then(TaskPriority::parse),
            due: arguments["due_date"].as_str().and_then(dates::parse_due_filter),
        }
    }

    fn format_message(tasks: &[Task]) -> String {
        let headline = match tasks.len() {
            0 => return "You don't have any tasks in your list right now.".to_string(),
            1 => "You have 1 task in your list:".to_string(),
            n => format!("Here are your {n} tasks:"),
        };

        let details: Vec<String> = tasks
            .iter()
            .map(|task| {
                let icon = match task.status {
                    TaskStatus::Completed => "✅",
                    TaskStatus::InProgress => "⏳",
                    _ => "📝",
                };
                let due = task
                    .due_date
                    .map(|d| format!(" (Due: {})", d.format("%b %d, %Y")))
                    .unwrap_or_default();
                format!(
                    "• {icon} {} - {}{due}",
                    task.title,
                    task.description.as_deref().unwrap_or("No description")
                )
            })
            .collect();

        format!("{headline}\n\n{}", details.join("\n"))
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "List all tasks with optional filtering by status, priority, and due date"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["pending", "in-progress", "completed", "cancelled"],
                    "description": "Filter tasks by status"
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "urgent"],
                    "description": "Filter tasks by priority"
                },
                "due_date": {
                    "type": "string",
                    "description": "Filter tasks by due date (e.g. '2026-02-23', 'overdue', 'today', 'this week', 'next week', 'this month')"
                }
            }
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolOutcome, ToolError> {
        let filter = Self::filter_from_args(&arguments);
        let tasks = self
            .store
            .list(&self.owner, &filter)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        let message = Self::format_message(&tasks);
        Ok(ToolOutcome::ok_with_data(
            message,
            serde_json::json!({ "tasks": tasks, "count": tasks.len() }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use taskmind_store::InMemoryTaskStore;

    fn owner() -> UserId {
        UserId::from("u1")
    }

    fn tool(store: Arc<InMemoryTaskStore>) -> ListTasksTool {
        ListTasksTool::new(store, owner())
    }

    #[tokio::test]
    async fn empty_list_message() {
        let store = Arc::new(InMemoryTaskStore::new());
        let outcome = tool(store).execute(serde_json::json!({})).await.unwrap();
        assert!(outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("You don't have any tasks in your list right now.")
        );
        assert_eq!(outcome.data.unwrap()["count"], 0);
    }

    #[tokio::test]
    async fn single_task_message() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "gym")).await.unwrap();

        let outcome = tool(store).execute(serde_json::json!({})).await.unwrap();
        let message = outcome.message.unwrap();
        assert!(message.starts_with("You have 1 task in your list:"));
        assert!(message.contains("📝 gym - No description"));
    }

    #[tokio::test]
    async fn message_lists_every_title() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "gym")).await.unwrap();
        store.create(Task::new(owner(), "groceries")).await.unwrap();
        store.create(Task::new(owner(), "taxes")).await.unwrap();

        let outcome = tool(store).execute(serde_json::json!({})).await.unwrap();
        let message = outcome.message.unwrap();
        assert!(message.starts_with("Here are your 3 tasks:"));
        for title in ["gym", "groceries", "taxes"] {
            assert!(message.contains(title), "missing {title}");
        }
    }

    #[tokio::test]
    async fn status_filter() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "open")).await.unwrap();
        let mut done = Task::new(owner(), "closed");
        done.status = TaskStatus::Completed;
        store.create(done).await.unwrap();

        let outcome = tool(store)
            .execute(serde_json::json!({"status": "completed"}))
            .await
            .unwrap();
        let message = outcome.message.unwrap();
        assert!(message.contains("closed"));
        assert!(!message.contains("open"));
    }

    #[tokio::test]
    async fn due_date_filter_with_explicit_date() {
        let store = Arc::new(InMemoryTaskStore::new());
        let mut task = Task::new(owner(), "gym");
        // A date firmly in the past so it never collides with "today".
        task.due_date = Some(Utc.with_ymd_and_hms(1999, 1, 15, 0, 0, 0).unwrap());
        store.create(task).await.unwrap();

        let on_date = tool(store.clone())
            .execute(serde_json::json!({"due_date": "1999-01-15"}))
            .await
            .unwrap();
        assert!(on_date.message.unwrap().contains("gym"));

        let today = tool(store)
            .execute(serde_json::json!({"due_date": "today"}))
            .await
            .unwrap();
        assert_eq!(today.data.unwrap()["count"], 0);
    }

    #[tokio::test]
    async fn unknown_filter_values_are_ignored() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(Task::new(owner(), "gym")).await.unwrap();

        let outcome = tool(store)
            .execute(serde_json::json!({"status": "bogus", "due_date": "someday"}))
            .await
            .unwrap();
        assert_eq!(outcome.data.unwrap()["count"], 1);
    }

    #[tokio::test]
    async fn due_date_shown_in_message() {
        let store = Arc::new(InMemoryTaskStore::new());
        let mut task = Task::new(owner(), "operation");
        task.due_date = Some(Utc.with_ymd_and_hms(2026, 2, 23, 0, 0, 0).unwrap());
        store.create(task).await.unwrap();

        let outcome = tool(store).execute(serde_json::json!({})).await.unwrap();
        assert!(outcome.message.unwrap().contains("(Due: Feb 23, 2026)"));
    }
}
