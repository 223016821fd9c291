//! Server-side logout via a token blacklist.
//!
//! A logged-out token is written to a [`RevocationStore`] under
//! `key_prefix + token` with an expiry equal to the token's own `exp`. Once
//! that instant passes the entry is meaningless (the token would fail
//! validation anyway) and is treated as absent.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use coolreq_core::types::Timestamp;
use coolreq_db::repositories::RevokedTokenRepo;
use coolreq_db::DbPool;
use tokio::sync::Mutex;

/// Default namespace prepended to every blacklist key.
pub const DEFAULT_KEY_PREFIX: &str = "coolreq.jwt.";

/// Default interval between purges of expired entries, in seconds.
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 300;

/// Shortest lifetime given to a blacklist entry.
const MIN_TTL_SECS: i64 = 1;

/// Failure of the backing store. Never treated as "not revoked".
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("Revocation store unavailable: {0}")]
    Database(#[from] sqlx::Error),
}

/// Blacklist configuration.
#[derive(Debug, Clone)]
pub struct RevocationConfig {
    /// Namespace prepended to every key.
    pub key_prefix: String,
    /// Seconds between purges of expired entries.
    pub purge_interval_secs: u64,
}

impl RevocationConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                          | Default        |
    /// |----------------------------------|----------------|
    /// | `REVOCATION_KEY_PREFIX`          | `coolreq.jwt.` |
    /// | `REVOCATION_PURGE_INTERVAL_SECS` | `300`          |
    pub fn from_env() -> Self {
        let key_prefix = std::env::var("REVOCATION_KEY_PREFIX")
            .unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());

        let purge_interval_secs: u64 = std::env::var("REVOCATION_PURGE_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_PURGE_INTERVAL_SECS.to_string())
            .parse()
            .expect("REVOCATION_PURGE_INTERVAL_SECS must be a valid u64");

        Self {
            key_prefix,
            purge_interval_secs,
        }
    }
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            purge_interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
        }
    }
}

/// Key/value store with per-key expiry.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Store `key` until `expires_at`.
    async fn insert(&self, key: &str, expires_at: Timestamp) -> Result<(), RevocationError>;
    /// Whether `key` is present and not yet expired.
    async fn contains(&self, key: &str) -> Result<bool, RevocationError>;
    /// Drop expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, RevocationError>;
}

/// Postgres-backed store shared by every server instance.
pub struct PgRevocationStore {
    pool: DbPool,
}

impl PgRevocationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn insert(&self, key: &str, expires_at: Timestamp) -> Result<(), RevocationError> {
        RevokedTokenRepo::insert(&self.pool, key, expires_at).await?;
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, RevocationError> {
        Ok(RevokedTokenRepo::is_revoked(&self.pool, key).await?)
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        Ok(RevokedTokenRepo::delete_expired(&self.pool).await?)
    }
}

/// In-process store (intended for tests and single-instance development).
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, Timestamp>>,
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn insert(&self, key: &str, expires_at: Timestamp) -> Result<(), RevocationError> {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_insert(expires_at);
        if *entry < expires_at {
            *entry = expires_at;
        }
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, RevocationError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).is_some_and(|exp| *exp > Utc::now()))
    }

    async fn purge_expired(&self) -> Result<u64, RevocationError> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Utc::now();
        entries.retain(|_, exp| *exp > now);
        Ok((before - entries.len()) as u64)
    }
}

/// The logout blacklist: key namespacing and expiry policy over a store.
pub struct Revocations {
    store: Arc<dyn RevocationStore>,
    key_prefix: String,
}

impl Revocations {
    pub fn new(store: Arc<dyn RevocationStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    /// Blacklist `token` until its expiry `exp` (Unix seconds).
    ///
    /// The entry lives for at least one second even if `exp` is already due.
    pub async fn revoke(&self, token: &str, exp: i64) -> Result<(), RevocationError> {
        let expires_at = entry_expiry(exp, Utc::now());
        self.store.insert(&self.key_for(token), expires_at).await
    }

    /// Whether `token` has been logged out.
    pub async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        self.store.contains(&self.key_for(token)).await
    }

    /// Whether the backing store answers lookups.
    pub async fn is_available(&self) -> bool {
        self.store.contains(&self.key_for("")).await.is_ok()
    }

    /// Drop expired entries from the store.
    pub async fn purge_expired(&self) -> Result<u64, RevocationError> {
        self.store.purge_expired().await
    }

    fn key_for(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }
}

/// Expiry instant for a blacklist entry: the token's `exp`, but never less
/// than [`MIN_TTL_SECS`] after `now`.
fn entry_expiry(exp: i64, now: DateTime<Utc>) -> Timestamp {
    let floor = now + Duration::seconds(MIN_TTL_SECS);
    match DateTime::from_timestamp(exp, 0) {
        Some(at) if at > floor => at,
        _ => floor,
    }
}
