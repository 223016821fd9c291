use std::sync::Arc;

use crate::auth::revocation::Revocations;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coolreq_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Logout blacklist consulted on every authenticated request.
    pub revocations: Arc<Revocations>,
}
