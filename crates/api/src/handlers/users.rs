//! Handlers for the `/users` resource (registration and own profile).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use coolreq_core::error::CoreError;
use coolreq_core::validation::validate_required_text;
use coolreq_db::models::user::{CreateUser, UpdateCredentials, UserResponse};
use coolreq_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
}

/// Request body for `PUT /users/me`. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/v1/users
///
/// Self-service registration. New users are never moderators.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_required_text("full_name", &input.full_name).map_err(CoreError::Validation)?;
    validate_required_text("username", &input.username).map_err(CoreError::Validation)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    let password_hash = hash(&input.password)?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            full_name: input.full_name.trim().to_string(),
            username: input.username.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        })?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/users/me
///
/// Change the caller's own login name and/or password.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateMeRequest>,
) -> AppResult<StatusCode> {
    if let Some(username) = &input.username {
        validate_required_text("username", username).map_err(CoreError::Validation)?;
    }
    let password_hash = match &input.password {
        Some(password) => {
            validate_password_strength(password, MIN_PASSWORD_LENGTH)
                .map_err(CoreError::Validation)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let update = UpdateCredentials {
        username: input.username.map(|u| u.trim().to_string()),
        password_hash,
    };
    UserRepo::update_credentials(&state.pool, auth.user_id, &update)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        })?;

    tracing::info!(user_id = auth.user_id, "User credentials updated");
    Ok(StatusCode::NO_CONTENT)
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}
