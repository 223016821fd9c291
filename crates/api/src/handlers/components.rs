//! Handlers for the `/components` catalog.
//!
//! Reads are public; mutations require a moderator.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coolreq_core::error::CoreError;
use coolreq_core::types::DbId;
use coolreq_core::validation::{validate_required_text, validate_tdp};
use coolreq_db::models::component::{Component, CreateComponent, UpdateComponent};
use coolreq_db::repositories::ComponentRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /components`.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentSearchParams {
    /// Case-insensitive title substring.
    pub title: Option<String>,
}

/// GET /api/v1/components
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ComponentSearchParams>,
) -> AppResult<Json<DataResponse<Vec<Component>>>> {
    let components = ComponentRepo::list(&state.pool, params.title.as_deref()).await?;
    Ok(Json(DataResponse { data: components }))
}

/// GET /api/v1/components/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Component>>> {
    let component = ComponentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Component",
            id,
        })?;
    Ok(Json(DataResponse { data: component }))
}

/// POST /api/v1/components
pub async fn create(
    State(state): State<AppState>,
    RequireModerator(moderator): RequireModerator,
    Json(input): Json<CreateComponent>,
) -> AppResult<(StatusCode, Json<DataResponse<Component>>)> {
    validate_required_text("title", &input.title).map_err(CoreError::Validation)?;
    validate_tdp(input.tdp).map_err(CoreError::Validation)?;

    let component = ComponentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        component_id = component.id,
        moderator_id = moderator.user_id,
        "Component created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: component })))
}

/// PUT /api/v1/components/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireModerator(_moderator): RequireModerator,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComponent>,
) -> AppResult<Json<DataResponse<Component>>> {
    if let Some(title) = &input.title {
        validate_required_text("title", title).map_err(CoreError::Validation)?;
    }
    if let Some(tdp) = input.tdp {
        validate_tdp(tdp).map_err(CoreError::Validation)?;
    }

    let component = ComponentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Component",
            id,
        })?;
    Ok(Json(DataResponse { data: component }))
}

/// DELETE /api/v1/components/{id}
///
/// Fails with 409 while any request references the component.
pub async fn delete(
    State(state): State<AppState>,
    RequireModerator(moderator): RequireModerator,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ComponentRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Component",
            id,
        }
        .into());
    }
    tracing::info!(component_id = id, moderator_id = moderator.user_id, "Component deleted");
    Ok(StatusCode::NO_CONTENT)
}
