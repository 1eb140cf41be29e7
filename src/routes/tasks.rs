use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        Subtask, SubtaskInput, SubtaskUpdate, Task, TaskInput, TaskListQuery, TaskSort,
        TaskUpdate, TaskWithSubtasks,
    },
    repo, stats,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks with their subtasks.
///
/// ## Query Parameters:
/// - `sort` (optional): one of `createdAt-asc`, `createdAt-desc`,
///   `completedAt-asc`, `completedAt-desc`, `order-asc`, `order-desc`.
///   Anything else falls back to `createdAt-desc`.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks, each carrying its `subtasks`.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query: web::Query<TaskListQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let sort = TaskSort::parse(query.sort.as_deref());
    let tasks = repo::tasks::list(&pool, user.id, sort).await?;
    let subtasks = repo::subtasks::list_for_user(&pool, user.id).await?;

    // Group subtasks under their parents via the task_id back-reference
    let mut grouped: HashMap<Uuid, Vec<Subtask>> = HashMap::new();
    for subtask in subtasks {
        grouped.entry(subtask.task_id).or_default().push(subtask);
    }

    let tasks: Vec<TaskWithSubtasks> = tasks
        .into_iter()
        .map(|task| {
            let subtasks = grouped.remove(&task.id).unwrap_or_default();
            TaskWithSubtasks { task, subtasks }
        })
        .collect();

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: empty or overlong text.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.id);
    let created = repo::tasks::insert(&pool, &task).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Partially updates a task.
///
/// Only fields present in the body overwrite; absent fields are preserved.
/// An explicit `"completed": false` clears the flag. The completion
/// timestamp follows the completed flag's transitions.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task, or owned by another user — the two are
///   indistinguishable.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut task = repo::tasks::find(&pool, user.id, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    task.apply_update(task_data.into_inner(), Utc::now());
    let updated = repo::tasks::save(&pool, &task).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task and, by cascade, every subtask referencing it.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task removed successfully"}`.
/// - `404 Not Found`: no such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let deleted = repo::tasks::delete_cascade(&pool, user.id, task_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task removed successfully" })))
}

/// Creates a subtask under one of the caller's tasks.
///
/// ## Responses:
/// - `201 Created`: the new `Subtask`.
/// - `404 Not Found`: parent task absent or not owned by the caller.
#[post("/{task_id}/subtasks")]
pub async fn create_subtask(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    subtask_data: web::Json<SubtaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    subtask_data.validate()?;

    // The parent must exist and belong to the caller before anything is
    // written.
    let parent = repo::tasks::find(&pool, user.id, task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    let subtask = Subtask::new(subtask_data.into_inner(), parent.id, user.id);
    let created = repo::subtasks::insert(&pool, &subtask).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Partially updates a subtask, scoped by subtask id, parent task id, and
/// owner together.
#[put("/{task_id}/subtasks/{id}")]
pub async fn update_subtask(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    subtask_data: web::Json<SubtaskUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    subtask_data.validate()?;
    let (task_id, subtask_id) = path.into_inner();

    let mut subtask = repo::subtasks::find(&pool, user.id, task_id, subtask_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subtask not found".into()))?;

    subtask.apply_update(subtask_data.into_inner());
    let updated = repo::subtasks::save(&pool, &subtask).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a subtask.
#[delete("/{task_id}/subtasks/{id}")]
pub async fn delete_subtask(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let (task_id, subtask_id) = path.into_inner();
    let deleted = repo::subtasks::delete(&pool, user.id, task_id, subtask_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Subtask not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Subtask removed successfully" })))
}

/// Overall completion statistics for a user's tasks.
///
/// The path id must match the authenticated identity; a mismatch is a 404 so
/// the endpoint reveals nothing about other users.
#[get("/stats/{user_id}")]
pub async fn task_stats(
    pool: web::Data<PgPool>,
    requested_user_id: web::Path<i32>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    if requested_user_id.into_inner() != user.id {
        return Err(AppError::NotFound("Tasks not found".into()));
    }

    let tasks = repo::tasks::list(&pool, user.id, TaskSort::default()).await?;

    Ok(HttpResponse::Ok().json(stats::completion_stats(tasks)))
}

/// Per-day completion trend for a user's tasks, bucketed by UTC calendar day
/// of creation.
#[get("/comp/{user_id}")]
pub async fn completion_trend(
    pool: web::Data<PgPool>,
    requested_user_id: web::Path<i32>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    if requested_user_id.into_inner() != user.id {
        return Err(AppError::NotFound("Tasks not found".into()));
    }

    let tasks = repo::tasks::list(&pool, user.id, TaskSort::default()).await?;

    Ok(HttpResponse::Ok().json(stats::daily_completion_trend(&tasks)))
}
