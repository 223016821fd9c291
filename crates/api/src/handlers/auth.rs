//! Handlers for the `/auth` resource (login, logout).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use coolreq_core::error::CoreError;
use coolreq_db::models::user::UserResponse;
use coolreq_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_token, validate_token};
use crate::auth::password::{dummy_hash, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{bearer_token, INVALID_TOKEN};
use crate::state::AppState;

/// Message for every failed login, whether the user exists or not.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username).await?;

    // Unknown users are verified against a dummy hash so both failure paths
    // cost the same.
    let hash = match &user {
        Some(user) => user.password_hash.as_str(),
        None => dummy_hash()
            .ok_or_else(|| AppError::InternalError("Dummy password hash unavailable".into()))?,
    };
    let password_valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let user = match user {
        Some(user) if password_valid => user,
        _ => {
            tracing::info!(username = %input.username, "Login failed");
            return Err(AppError::Core(CoreError::Unauthorized(
                INVALID_CREDENTIALS.into(),
            )));
        }
    };

    let token = generate_token(user.id, user.is_moderator, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, is_moderator = user.is_moderator, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.config.jwt.expiry_secs(),
        user: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented token for the rest of its lifetime. A missing or
/// malformed header is a bad request; an invalid or already revoked token
/// is unauthorized.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<StatusCode> {
    let token =
        bearer_token(&headers).map_err(|e| AppError::BadRequest(e.message().to_string()))?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized(INVALID_TOKEN.into())))?;

    if state.revocations.is_revoked(token).await? {
        return Err(AppError::Core(CoreError::Unauthorized(INVALID_TOKEN.into())));
    }

    state.revocations.revoke(token, claims.exp).await?;

    tracing::info!(user_id = claims.sub, "User logged out");
    Ok(StatusCode::OK)
}
