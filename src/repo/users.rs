use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{User, UserCredentials};

/// Inserts a new user. The caller hashes the password; this is the only
/// write path that ever touches `password_hash`.
pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING id, name, email, created_at",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let row = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Fetches the credential row for a login attempt.
pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserCredentials>, AppError> {
    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Fetches a user's profile by id. Used by the auth guard to confirm a
/// token's subject still exists, and by the profile endpoint.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
