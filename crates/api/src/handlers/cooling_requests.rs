//! Handlers for the `/cooling-requests` resource.
//!
//! Creation, edits, formation, deletion and ledger changes are owner-only;
//! resolution is moderator-only. Reads are scoped to the caller's own
//! requests unless the caller is a moderator.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coolreq_core::error::CoreError;
use coolreq_core::lifecycle::ResolveAction;
use coolreq_core::pagination::PageRequest;
use coolreq_core::types::DbId;
use coolreq_core::validation::{
    normalize_quantity, parse_date_range, parse_status_filter, validate_room_dimension,
};
use coolreq_db::models::cooling_request::{
    CartBadge, CoolingRequest, CoolingRequestDetail, CreatorRequestCount, DraftAddition,
    RequestListFilter, UpdateRoom,
};
use coolreq_db::repositories::CoolingRequestRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /cooling-requests`.
#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsParams {
    /// One status id or a comma-separated set (`?status=3,4`).
    pub status: Option<String>,
    /// Inclusive lower bound on the forming date (`YYYY-MM-DD`).
    pub from: Option<String>,
    /// Inclusive upper bound on the forming date (`YYYY-MM-DD`).
    pub to: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One page of requests.
#[derive(Debug, Serialize)]
pub struct RequestPage {
    pub items: Vec<CoolingRequest>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    /// Matching requests per creator; moderators only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_counts: Option<Vec<CreatorRequestCount>>,
}

/// Request body for `PUT /cooling-requests/{id}/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// `"complete"` or `"reject"`.
    pub action: String,
}

/// Request body for `PUT /cooling-requests/{id}/components/{component_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i32>,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// POST /api/v1/cooling-requests/draft/components/{component_id}
///
/// Add a component to the caller's draft, creating the draft if needed.
pub async fn add_to_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(component_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftAddition>>)> {
    let addition = CoolingRequestRepo::add_to_draft(&state.pool, auth.user_id, component_id).await?;

    tracing::info!(
        request_id = addition.request_id,
        component_id,
        user_id = auth.user_id,
        added = addition.added,
        "Component added to draft"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: addition })))
}

/// GET /api/v1/cooling-requests/cart
///
/// The caller's draft id (or null) and how many components it holds.
pub async fn cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CartBadge>>> {
    let badge = CoolingRequestRepo::cart(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: badge }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/cooling-requests
///
/// List non-draft, non-deleted requests. Moderators see every creator and
/// receive per-creator counts.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListRequestsParams>,
) -> AppResult<Json<DataResponse<RequestPage>>> {
    let statuses = parse_status_filter(params.status.as_deref().unwrap_or(""))
        .map_err(CoreError::Validation)?;
    let range = parse_date_range(params.from.as_deref(), params.to.as_deref())
        .map_err(CoreError::Validation)?;
    let page = PageRequest::new(params.page, params.page_size);

    let filter = RequestListFilter {
        statuses: statuses.into_iter().map(|s| s.id()).collect(),
        formed_from: range.start,
        formed_before: range.end,
        creator_id: auth.owner_scope(),
    };

    let items = CoolingRequestRepo::list(&state.pool, &filter, &page).await?;
    let total = CoolingRequestRepo::count(&state.pool, &filter).await?;
    let creator_counts = if auth.is_moderator {
        Some(CoolingRequestRepo::creator_counts(&state.pool, &filter).await?)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: RequestPage {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
            creator_counts,
        },
    }))
}

/// GET /api/v1/cooling-requests/{id}
///
/// A request with its components. Another user's request is reported as
/// not found unless the caller is a moderator.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CoolingRequestDetail>>> {
    let detail = CoolingRequestRepo::find_detail(&state.pool, id, auth.owner_scope())
        .await?
        .ok_or(CoreError::NotFound {
            entity: "CoolingRequest",
            id,
        })?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// PUT /api/v1/cooling-requests/{id}
///
/// Update the room dimensions. Only supplied fields change.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoom>,
) -> AppResult<StatusCode> {
    validate_room_dimension("room_area", input.room_area).map_err(CoreError::Validation)?;
    validate_room_dimension("room_height", input.room_height).map_err(CoreError::Validation)?;

    CoolingRequestRepo::update_room(&state.pool, id, auth.user_id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/cooling-requests/{id}/form
///
/// Submit a draft for moderation.
pub async fn form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CoolingRequestRepo::form(&state.pool, id, auth.user_id).await?;
    tracing::info!(request_id = id, user_id = auth.user_id, "Cooling request formed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/cooling-requests/{id}/resolve
///
/// Complete or reject a formed request (moderator only).
pub async fn resolve(
    State(state): State<AppState>,
    RequireModerator(moderator): RequireModerator,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<StatusCode> {
    let action: ResolveAction = input.action.trim().parse()?;

    let resolved = CoolingRequestRepo::resolve(&state.pool, id, moderator.user_id, action).await?;

    tracing::info!(
        request_id = id,
        moderator_id = moderator.user_id,
        status = resolved.status_id,
        cooling_power = resolved.cooling_power,
        "Cooling request resolved"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cooling-requests/{id}
///
/// Logically delete a draft or formed request.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CoolingRequestRepo::delete(&state.pool, id, auth.user_id).await?;
    tracing::info!(request_id = id, user_id = auth.user_id, "Cooling request deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// DELETE /api/v1/cooling-requests/{id}/components/{component_id}
///
/// Remove a component. Removing the last one deletes the request.
pub async fn remove_component(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, component_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let emptied =
        CoolingRequestRepo::remove_component(&state.pool, id, component_id, auth.user_id).await?;
    if emptied {
        tracing::info!(request_id = id, "Last component removed, request deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/cooling-requests/{id}/components/{component_id}
///
/// Change a component's quantity. An absent or zero quantity changes nothing.
pub async fn update_quantity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, component_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateQuantityRequest>,
) -> AppResult<StatusCode> {
    let quantity = normalize_quantity(input.quantity).map_err(CoreError::Validation)?;
    CoolingRequestRepo::update_quantity(&state.pool, id, component_id, auth.user_id, quantity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
