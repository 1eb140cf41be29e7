use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Subtask;

const SUBTASK_COLUMNS: &str =
    "id, task_id, user_id, text, completed, canceled, sort_order, created_at";

pub async fn insert(pool: &PgPool, subtask: &Subtask) -> Result<Subtask, AppError> {
    let sql = format!(
        "INSERT INTO subtasks (id, task_id, user_id, text, completed, canceled, sort_order, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {SUBTASK_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Subtask>(&sql)
        .bind(subtask.id)
        .bind(subtask.task_id)
        .bind(subtask.user_id)
        .bind(&subtask.text)
        .bind(subtask.completed)
        .bind(subtask.canceled)
        .bind(subtask.order)
        .bind(subtask.created_at)
        .fetch_one(pool)
        .await?;

    Ok(created)
}

/// Looks up a subtask scoped by its own id, its parent task id, and the
/// owning user. A mismatch on any of the three behaves like "not found".
pub async fn find(
    pool: &PgPool,
    user_id: i32,
    task_id: Uuid,
    subtask_id: Uuid,
) -> Result<Option<Subtask>, AppError> {
    let sql = format!(
        "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE id = $1 AND task_id = $2 AND user_id = $3"
    );
    let subtask = sqlx::query_as::<_, Subtask>(&sql)
        .bind(subtask_id)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(subtask)
}

/// Persists a merged subtask after a partial update.
pub async fn save(pool: &PgPool, subtask: &Subtask) -> Result<Subtask, AppError> {
    let sql = format!(
        "UPDATE subtasks
         SET text = $1, completed = $2, canceled = $3, sort_order = $4
         WHERE id = $5 AND user_id = $6
         RETURNING {SUBTASK_COLUMNS}"
    );
    let saved = sqlx::query_as::<_, Subtask>(&sql)
        .bind(&subtask.text)
        .bind(subtask.completed)
        .bind(subtask.canceled)
        .bind(subtask.order)
        .bind(subtask.id)
        .bind(subtask.user_id)
        .fetch_one(pool)
        .await?;

    Ok(saved)
}

/// Deletes a subtask. Returns `false` when nothing matched.
pub async fn delete(
    pool: &PgPool,
    user_id: i32,
    task_id: Uuid,
    subtask_id: Uuid,
) -> Result<bool, AppError> {
    let result =
        sqlx::query("DELETE FROM subtasks WHERE id = $1 AND task_id = $2 AND user_id = $3")
            .bind(subtask_id)
            .bind(task_id)
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetches every subtask a user owns, for grouping under their tasks.
/// Ordered by the user-defined sort key, then creation time.
pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Subtask>, AppError> {
    let sql = format!(
        "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE user_id = $1
         ORDER BY sort_order ASC, created_at ASC"
    );
    let subtasks = sqlx::query_as::<_, Subtask>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(subtasks)
}
