//! Cooling request model, ledger lines and listing types.

use coolreq_core::status::{RequestStatus, StatusId};
use coolreq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cooling_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CoolingRequest {
    pub id: DbId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub formed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
    pub creator_id: DbId,
    pub moderator_id: Option<DbId>,
    pub room_area: Option<f64>,
    pub room_height: Option<f64>,
    /// Required cooling capacity in kW, set when the request is completed.
    pub cooling_power: Option<f64>,
}

impl CoolingRequest {
    /// Decode `status_id`. `None` only if the row holds an unknown id.
    pub fn status(&self) -> Option<RequestStatus> {
        RequestStatus::from_id(self.status_id)
    }
}

/// One ledger line joined with its catalog component.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestComponentLine {
    pub component_id: DbId,
    pub title: String,
    pub description: String,
    pub tdp: i32,
    pub image_url: Option<String>,
    pub quantity: i32,
}

/// A request together with its ledger.
#[derive(Debug, Clone, Serialize)]
pub struct CoolingRequestDetail {
    #[serde(flatten)]
    pub request: CoolingRequest,
    pub components: Vec<RequestComponentLine>,
}

/// DTO for editing a request's room dimensions. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoom {
    pub room_area: Option<f64>,
    pub room_height: Option<f64>,
}

/// Result of adding a component to the caller's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftAddition {
    pub request_id: DbId,
    /// `false` when the component was already in the draft.
    pub added: bool,
}

/// The caller's draft id and how many components it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartBadge {
    pub request_id: Option<DbId>,
    pub count: i64,
}

/// Filters for request listings.
///
/// Drafts and deleted requests are always excluded regardless of `statuses`.
#[derive(Debug, Clone, Default)]
pub struct RequestListFilter {
    /// Empty means every listable status.
    pub statuses: Vec<StatusId>,
    /// Inclusive lower bound on `formed_at`.
    pub formed_from: Option<Timestamp>,
    /// Exclusive upper bound on `formed_at`.
    pub formed_before: Option<Timestamp>,
    /// Restrict to one creator's requests.
    pub creator_id: Option<DbId>,
}

/// Number of matching requests per creator (moderator listings).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreatorRequestCount {
    pub creator_id: DbId,
    pub username: String,
    pub request_count: i64,
}
