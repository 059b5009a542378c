//! Task domain types.
//!
//! Tasks are owned by exactly one user; every query that touches a task
//! carries the owner id in its signature so cross-user access is
//! impossible by construction (see the `store` module).

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Parse the wire form ("pending", "in-progress", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority level of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single task owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task with default priority.
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

/// Filter for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DueFilter>,
}

impl TaskFilter {
    /// Whether the given task passes this filter at the given instant.
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        if let Some(due) = &self.due {
            let Some(due_date) = task.due_date else {
                return false;
            };
            if !due.contains(due_date, now) {
                return false;
            }
        }
        true
    }
}

/// A due-date window expressed relative to "now", or an explicit date.
///
/// Keyword windows are aligned to UTC midnights; weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueFilter {
    Overdue,
    Today,
    ThisWeek,
    NextWeek,
    ThisMonth,
    On(NaiveDate),
}

impl DueFilter {
    /// Whether `due` falls inside this window, evaluated at `now`.
    pub fn contains(&self, due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        match self {
            Self::Overdue => due < now,
            Self::Today => due.date_naive() == today,
            Self::ThisWeek => {
                let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                let d = due.date_naive();
                d >= week_start && d < week_start + Duration::days(7)
            }
            Self::NextWeek => {
                let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64)
                    + Duration::days(7);
                let d = due.date_naive();
                d >= week_start && d < week_start + Duration::days(7)
            }
            Self::ThisMonth => {
                let d = due.date_naive();
                d.year() == today.year() && d.month() == today.month()
            }
            Self::On(date) => due.date_naive() == *date,
        }
    }
}

/// Summary of a user's tasks, returned alongside chat responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateReflection {
    pub user_id: String,
    pub task_count: usize,
    pub task_counts_by_status: HashMap<String, usize>,
    pub last_updated: DateTime<Utc>,
}
