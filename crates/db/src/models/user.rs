//! User entity model and DTOs.

use coolreq_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub is_moderator: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub full_name: String,
    pub username: String,
    pub is_moderator: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            username: user.username.clone(),
            is_moderator: user.is_moderator,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. Self-registered users are never moderators.
#[derive(Debug)]
pub struct CreateUser {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
}

/// DTO for a user changing their own credentials. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdateCredentials {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}
