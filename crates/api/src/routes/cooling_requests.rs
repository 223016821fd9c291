//! Route definitions for the `/cooling-requests` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::cooling_requests;
use crate::state::AppState;

/// Routes mounted at `/cooling-requests`.
///
/// ```text
/// GET    /                                  -> list
/// GET    /cart                              -> cart
/// POST   /draft/components/{component_id}   -> add_to_draft
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// PUT    /{id}/form                         -> form
/// PUT    /{id}/resolve                      -> resolve
/// PUT    /{id}/components/{component_id}    -> update_quantity
/// DELETE /{id}/components/{component_id}    -> remove_component
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cooling_requests::list))
        .route("/cart", get(cooling_requests::cart))
        .route(
            "/draft/components/{component_id}",
            post(cooling_requests::add_to_draft),
        )
        .route(
            "/{id}",
            get(cooling_requests::get_by_id)
                .put(cooling_requests::update)
                .delete(cooling_requests::delete),
        )
        .route("/{id}/form", put(cooling_requests::form))
        .route("/{id}/resolve", put(cooling_requests::resolve))
        .route(
            "/{id}/components/{component_id}",
            put(cooling_requests::update_quantity).delete(cooling_requests::remove_component),
        )
}
