//! Task tool implementations for taskmind.
//!
//! Tools are the agent's only way of acting on the task store. Each
//! tool is constructed for a specific user, so every store query it
//! issues carries that owner id; there is no way for a tool call to
//! touch another user's tasks.

pub mod complete_task;
pub mod create_task;
pub mod dates;
pub mod delete_all;
pub mod delete_task;
pub mod list_tasks;
pub mod mark_incomplete;
pub mod set_schedule;
pub mod update_task;

mod resolve;

use std::sync::Arc;
use taskmind_core::store::TaskStore;
use taskmind_core::task::UserId;
use taskmind_core::tool::ToolRegistry;

pub use complete_task::CompleteTaskTool;
pub use create_task::CreateTaskTool;
pub use delete_all::DeleteAllTasksTool;
pub use delete_task::DeleteTaskTool;
pub use list_tasks::ListTasksTool;
pub use mark_incomplete::MarkIncompleteTool;
pub use set_schedule::SetScheduleTool;
pub use update_task::UpdateTaskTool;

/// Create a tool registry scoped to one user.
///
/// `set_task_schedule` is also registered under its historical alias
/// `set_task_date`; both names reach the same handler.
pub fn registry_for_user(store: Arc<dyn TaskStore>, owner: UserId) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CreateTaskTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(ListTasksTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(UpdateTaskTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(CompleteTaskTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(MarkIncompleteTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(DeleteTaskTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(DeleteAllTasksTool::new(store.clone(), owner.clone())));
    registry.register(Box::new(SetScheduleTool::new(
        store.clone(),
        owner.clone(),
        "set_task_schedule",
    )));
    registry.register(Box::new(SetScheduleTool::new(store, owner, "set_task_date")));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmind_store::InMemoryTaskStore;

    #[test]
    fn registry_exposes_all_tools() {
        let store = Arc::new(InMemoryTaskStore::new());
        let registry = registry_for_user(store, UserId::from("u1"));

        for name in [
            "create_task",
            "list_tasks",
            "update_task",
            "complete_task",
            "mark_task_incomplete",
            "delete_task",
            "delete_all_tasks",
            "set_task_schedule",
            "set_task_date",
        ] {
            assert!(registry.get(name).is_some(), "missing tool {name}");
        }
    }
}
