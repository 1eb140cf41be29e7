use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's public profile, as returned by the API.
///
/// The password hash never leaves the repository layer; see
/// [`UserCredentials`] for the row the login path reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A full user row including the stored password hash.
///
/// Only the login handler and the auth guard read this; it is never
/// serialized into a response.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserCredentials {
    /// Drops the password hash, leaving the response-safe profile.
    pub fn into_profile(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}
