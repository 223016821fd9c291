//! Repository for the `revoked_tokens` table.

use coolreq_core::types::Timestamp;
use sqlx::PgPool;

/// Stores revoked session tokens until their natural expiry.
pub struct RevokedTokenRepo;

impl RevokedTokenRepo {
    /// Record `key` as revoked until `expires_at`.
    ///
    /// Re-revoking an existing key keeps the later expiry.
    pub async fn insert(pool: &PgPool, key: &str, expires_at: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO revoked_tokens (key, expires_at) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE
             SET expires_at = GREATEST(revoked_tokens.expires_at, EXCLUDED.expires_at)",
        )
        .bind(key)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether `key` is revoked. Expired rows count as absent.
    pub async fn is_revoked(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE key = $1 AND expires_at > NOW())",
        )
        .bind(key)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
