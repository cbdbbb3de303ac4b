use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum; declaration order doubles as
/// the sort order (pending < in_progress < completed < on_hold < cancelled).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is finished.
    Completed,
    /// Task is paused.
    OnHold,
    /// Task was abandoned.
    Cancelled,
}

/// Priority value meaning "no priority assigned".
pub const NO_PRIORITY: i32 = -1;

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task, up to 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,

    /// The status of the task. Defaults to `Pending` when omitted.
    pub status: Option<TaskStatus>,

    /// Numeric priority, minimum -1 where -1 denotes "no priority".
    #[validate(range(min = -1))]
    pub priority: Option<i32>,
}

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    /// Numeric priority; -1 denotes "no priority".
    pub priority: i32,
    /// Identifier of the user who owns the task. Ownership is immutable
    /// through the API.
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing/filtering tasks. Filtering is exact-match.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub title: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<i32>,
    /// One of `title`, `dueDate`, `status`, `priority`.
    pub sort_by: Option<String>,
    /// `ascending` or `descending` (any prefix of "des…" counts as descending).
    pub sort_order: Option<String>,
}

impl TaskQuery {
    /// Builds an `ORDER BY` clause from the whitelisted sort parameters, or
    /// `None` when no sorting was requested.
    ///
    /// `sortOrder` without `sortBy` sorts by priority; `sortBy` without
    /// `sortOrder` is ascending. Column names come from a fixed whitelist,
    /// never from user input.
    pub fn order_clause(&self) -> Option<String> {
        if self.sort_by.is_none() && self.sort_order.is_none() {
            return None;
        }

        let ascending = self
            .sort_order
            .as_deref()
            .map_or(true, |order| !order.to_lowercase().starts_with("des"));

        let column = match self.sort_by.as_deref().unwrap_or("priority") {
            "title" => "title",
            "dueDate" => "due_date",
            "status" => "status",
            _ => "priority",
        };

        Some(format!(
            "{} {}",
            column,
            if ascending { "ASC" } else { "DESC" }
        ))
    }
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the owner's user id.
    /// Missing status defaults to `Pending`, missing priority to -1.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            status: input.status.unwrap_or(TaskStatus::Pending),
            priority: input.priority.unwrap_or(NO_PRIORITY),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}
