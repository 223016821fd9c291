//! Repository for the `users` table.

use coolreq_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateCredentials, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, username, password_hash, is_moderator, created_at, updated_at";

/// Provides account operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new (non-moderator) user, returning the created row.
    ///
    /// A taken username fails with the `uq_users_username` unique violation.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (full_name, username, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.full_name)
            .bind(&input.username)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's login name and/or password hash. Only non-`None`
    /// fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_credentials(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCredentials,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Grant or revoke the moderator flag. Not reachable through self-service.
    ///
    /// Returns `true` if the row was updated.
    pub async fn set_moderator(
        pool: &PgPool,
        id: DbId,
        is_moderator: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_moderator = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(is_moderator)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
