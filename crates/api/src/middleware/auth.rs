//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use coolreq_core::error::CoreError;
use coolreq_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Message for every token that fails validation or has been revoked.
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Why a request carries no usable Bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    Missing,
    Malformed,
}

impl BearerError {
    pub fn message(self) -> &'static str {
        match self {
            BearerError::Missing => "Missing Authorization header",
            BearerError::Malformed => "Invalid Authorization format. Expected: Bearer <token>",
        }
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let header = headers
        .get("authorization")
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(BearerError::Malformed),
    }
}

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The token must verify and must not have been logged out. Use this as an
/// extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Whether the user holds the moderator role.
    pub is_moderator: bool,
}

impl AuthUser {
    /// Creator scope for reads: `None` for moderators (see everything),
    /// otherwise the caller's own id.
    pub fn owner_scope(&self) -> Option<DbId> {
        if self.is_moderator {
            None
        } else {
            Some(self.user_id)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .map_err(|e| AppError::Core(CoreError::Unauthorized(e.message().into())))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| AppError::Core(CoreError::Unauthorized(INVALID_TOKEN.into())))?;

        if state.revocations.is_revoked(token).await? {
            return Err(AppError::Core(CoreError::Unauthorized(INVALID_TOKEN.into())));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            is_moderator: claims.moderator,
        })
    }
}
