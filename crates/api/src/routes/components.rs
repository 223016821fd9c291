//! Route definitions for the `/components` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::components;
use crate::state::AppState;

/// Routes mounted at `/components`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create (moderator)
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update (moderator)
/// DELETE /{id}   -> delete (moderator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(components::list).post(components::create))
        .route(
            "/{id}",
            get(components::get_by_id)
                .put(components::update)
                .delete(components::delete),
        )
}
