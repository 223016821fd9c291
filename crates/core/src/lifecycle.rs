//! Cooling request state machine.
//!
//! ```text
//! Draft ──form──▶ Formed ──resolve(complete)──▶ Completed
//!   │               │    └─resolve(reject)────▶ Rejected
//!   └────delete─────┴──────────────────────────▶ Deleted
//! ```
//!
//! The guard functions here are pure: the repository layer loads the row
//! under a lock, calls the guard, and only then writes. A guard failure is
//! a [`TransitionError`] and leaves the stored request untouched.

use std::str::FromStr;

use crate::cooling::RoomGeometry;
use crate::status::RequestStatus;
use crate::types::DbId;

/// Action string for completing a formed request.
pub const ACTION_COMPLETE: &str = "complete";

/// Action string for rejecting a formed request.
pub const ACTION_REJECT: &str = "reject";

/// A lifecycle precondition that did not hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Only the creator can form this request")]
    NotCreator,

    #[error("Only the owner can modify this request")]
    NotOwner,

    #[error("Only a draft request can be formed (current status: {0})")]
    NotDraft(RequestStatus),

    #[error("Only a formed request can be resolved (current status: {0})")]
    NotFormed(RequestStatus),

    #[error("A {0} request cannot be deleted")]
    NotDeletable(RequestStatus),

    #[error("The components of a {0} request can no longer be changed")]
    NotEditable(RequestStatus),

    #[error("Room area and height are required before forming")]
    MissingRoomGeometry,

    #[error("Component {component_id} is not part of request {request_id}")]
    NotLinked { request_id: DbId, component_id: DbId },

    #[error("Invalid action '{0}', must be 'complete' or 'reject'")]
    UnknownAction(String),
}

/// Moderator decision on a formed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveAction {
    Complete,
    Reject,
}

impl ResolveAction {
    /// The status a formed request moves to under this action.
    pub fn target_status(self) -> RequestStatus {
        match self {
            ResolveAction::Complete => RequestStatus::Completed,
            ResolveAction::Reject => RequestStatus::Rejected,
        }
    }
}

impl FromStr for ResolveAction {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ACTION_COMPLETE => Ok(ResolveAction::Complete),
            ACTION_REJECT => Ok(ResolveAction::Reject),
            other => Err(TransitionError::UnknownAction(other.to_string())),
        }
    }
}

/// Check that `caller_id` owns a request created by `creator_id`.
pub fn ensure_owner(creator_id: DbId, caller_id: DbId) -> Result<(), TransitionError> {
    if creator_id == caller_id {
        Ok(())
    } else {
        Err(TransitionError::NotOwner)
    }
}

/// Guard for `Draft → Formed`.
///
/// Returns the validated room geometry so the caller cannot form a request
/// whose volume would be zero.
pub fn check_form(
    status: RequestStatus,
    creator_id: DbId,
    caller_id: DbId,
    room_area: Option<f64>,
    room_height: Option<f64>,
) -> Result<RoomGeometry, TransitionError> {
    if creator_id != caller_id {
        return Err(TransitionError::NotCreator);
    }
    if status != RequestStatus::Draft {
        return Err(TransitionError::NotDraft(status));
    }
    RoomGeometry::from_optional(room_area, room_height).ok_or(TransitionError::MissingRoomGeometry)
}

/// Guard for `Formed → Completed | Rejected`.
pub fn check_resolve(status: RequestStatus) -> Result<(), TransitionError> {
    if status == RequestStatus::Formed {
        Ok(())
    } else {
        Err(TransitionError::NotFormed(status))
    }
}

/// Guard for `Draft | Formed → Deleted`.
pub fn check_delete(status: RequestStatus) -> Result<(), TransitionError> {
    match status {
        RequestStatus::Draft | RequestStatus::Formed => Ok(()),
        other => Err(TransitionError::NotDeletable(other)),
    }
}

/// Guard for ledger mutations (quantity edits, link removal).
///
/// Links stay editable until the request is resolved.
pub fn check_ledger_editable(status: RequestStatus) -> Result<(), TransitionError> {
    match status {
        RequestStatus::Draft | RequestStatus::Formed => Ok(()),
        other => Err(TransitionError::NotEditable(other)),
    }
}
