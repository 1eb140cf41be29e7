use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a subtask entity.
///
/// The `task_id` back-reference is the single authoritative link between a
/// subtask and its parent; `user_id` is denormalized from the parent task so
/// ownership checks never need a join.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subtask {
    /// Unique identifier for the subtask (UUID v4).
    pub id: Uuid,
    /// Identifier of the parent task. Immutable after creation.
    pub task_id: Uuid,
    /// Identifier of the owning user, copied from the parent task.
    pub user_id: i32,
    /// The subtask text.
    pub text: String,
    /// Whether the subtask is completed.
    pub completed: bool,
    /// Whether the subtask is canceled.
    pub canceled: bool,
    /// User-defined sort key within the parent task.
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    /// Timestamp of when the subtask was created.
    pub created_at: DateTime<Utc>,
}

/// Input structure for creating a subtask.
#[derive(Debug, Deserialize, Validate)]
pub struct SubtaskInput {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
}

/// Field-level partial update for a subtask. Same presence semantics as
/// [`crate::models::TaskUpdate`].
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubtaskUpdate {
    #[validate(length(min = 1, max = 1000))]
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub order: Option<i32>,
}

impl Subtask {
    /// Creates a new `Subtask` under the given parent task and owner.
    pub fn new(input: SubtaskInput, task_id: Uuid, user_id: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            text: input.text,
            completed: false,
            canceled: false,
            order: 0,
            created_at: Utc::now(),
        }
    }

    /// Applies a partial update; only provided fields overwrite.
    pub fn apply_update(&mut self, update: SubtaskUpdate) {
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(completed) = update.completed {
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
