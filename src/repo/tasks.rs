use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskSort};

const TASK_COLUMNS: &str =
    "id, user_id, text, completed, canceled, sort_order, created_at, completed_at";

pub async fn insert(pool: &PgPool, task: &Task) -> Result<Task, AppError> {
    let sql = format!(
        "INSERT INTO tasks (id, user_id, text, completed, canceled, sort_order, created_at, completed_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {TASK_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Task>(&sql)
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.text)
        .bind(task.completed)
        .bind(task.canceled)
        .bind(task.order)
        .bind(task.created_at)
        .bind(task.completed_at)
        .fetch_one(pool)
        .await?;

    Ok(created)
}

pub async fn find(pool: &PgPool, user_id: i32, task_id: Uuid) -> Result<Option<Task>, AppError> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(task)
}

/// Lists a user's tasks in the requested order.
pub async fn list(pool: &PgPool, user_id: i32, sort: TaskSort) -> Result<Vec<Task>, AppError> {
    // The ORDER BY fragment comes from the TaskSort enum, not the caller.
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY {}",
        sort.order_by()
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(tasks)
}

/// Persists a merged task after a partial update.
pub async fn save(pool: &PgPool, task: &Task) -> Result<Task, AppError> {
    let sql = format!(
        "UPDATE tasks
         SET text = $1, completed = $2, canceled = $3, sort_order = $4, completed_at = $5
         WHERE id = $6 AND user_id = $7
         RETURNING {TASK_COLUMNS}"
    );
    let saved = sqlx::query_as::<_, Task>(&sql)
        .bind(&task.text)
        .bind(task.completed)
        .bind(task.canceled)
        .bind(task.order)
        .bind(task.completed_at)
        .bind(task.id)
        .bind(task.user_id)
        .fetch_one(pool)
        .await?;

    Ok(saved)
}

/// Deletes a task and every subtask whose `task_id` references it, inside a
/// single transaction. Returns `false` when no task matched the id/owner
/// pair, in which case nothing was deleted.
pub async fn delete_cascade(pool: &PgPool, user_id: i32, task_id: Uuid) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM subtasks WHERE task_id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}
