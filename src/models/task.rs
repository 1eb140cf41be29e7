use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::Subtask;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the owning user. Immutable after creation.
    pub user_id: i32,
    /// The task text.
    pub text: String,
    /// Whether the task is completed.
    pub completed: bool,
    /// Whether the task is canceled.
    pub canceled: bool,
    /// User-defined sort key. Stored as `sort_order` (`order` is reserved
    /// in SQL).
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Set when `completed` transitions to true, cleared when it transitions
    /// back.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A task together with its subtasks, as returned by the list endpoint.
///
/// The subtask collection is computed from each subtask's `task_id`
/// back-reference; tasks do not carry a subtask-id array of their own.
#[derive(Debug, Serialize)]
pub struct TaskWithSubtasks {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Subtask>,
}

/// Input structure for creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

/// Field-level partial update for a task.
///
/// Presence and value are independent: an explicit `"completed": false`
/// clears the flag, while omitting the key leaves it untouched. An empty
/// `text` is a validation error, never a silent keep.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub order: Option<i32>,
}

/// Query parameters for the task list endpoint.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub sort: Option<String>,
}

/// The enumerated sort keys accepted by `GET /tasks?sort=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    CompletedAtAsc,
    CompletedAtDesc,
    OrderAsc,
    OrderDesc,
}

impl TaskSort {
    /// Maps a query-string key to a sort. Unrecognized or absent keys
    /// default to `createdAt-desc`.
    pub fn parse(key: Option<&str>) -> Self {
        match key {
            Some("createdAt-asc") => TaskSort::CreatedAtAsc,
            Some("createdAt-desc") => TaskSort::CreatedAtDesc,
            Some("completedAt-asc") => TaskSort::CompletedAtAsc,
            Some("completedAt-desc") => TaskSort::CompletedAtDesc,
            Some("order-asc") => TaskSort::OrderAsc,
            Some("order-desc") => TaskSort::OrderDesc,
            _ => TaskSort::default(),
        }
    }

    /// The ORDER BY fragment for this sort. A fixed string per variant;
    /// caller input never reaches the SQL text.
    pub fn order_by(self) -> &'static str {
        match self {
            TaskSort::CreatedAtAsc => "created_at ASC",
            TaskSort::CreatedAtDesc => "created_at DESC",
            // Never-completed tasks sort after completed ones either way
            TaskSort::CompletedAtAsc => "completed_at ASC NULLS LAST",
            TaskSort::CompletedAtDesc => "completed_at DESC NULLS LAST",
            TaskSort::OrderAsc => "sort_order ASC",
            TaskSort::OrderDesc => "sort_order DESC",
        }
    }
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the owner's user id.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: input.text,
            completed: false,
            canceled: false,
            order: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Applies a partial update. Only provided fields overwrite; absent
    /// fields are preserved. `completed_at` tracks the completed flag: set
    /// on the transition to true, cleared whenever the flag is false.
    pub fn apply_update(&mut self, update: TaskUpdate, now: DateTime<Utc>) {
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(completed) = update.completed {
            if completed && !self.completed {
                self.completed_at = Some(now);
            } else if !completed {
                self.completed_at = None;
            }
            self.completed = completed;
        }
        if let Some(canceled) = update.canceled {
            self.canceled = canceled;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
    }
}
