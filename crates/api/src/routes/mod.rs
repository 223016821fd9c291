pub mod auth;
pub mod components;
pub mod cooling_requests;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                          login (public)
/// /auth/logout                                         logout (bearer token)
///
/// /users                                               register (public)
/// /users/me                                            own profile, update credentials
///
/// /cooling-requests                                    list
/// /cooling-requests/cart                               cart badge
/// /cooling-requests/draft/components/{component_id}    add to draft (POST)
/// /cooling-requests/{id}                               get, edit room, delete
/// /cooling-requests/{id}/form                          form (PUT)
/// /cooling-requests/{id}/resolve                       resolve (PUT, moderator)
/// /cooling-requests/{id}/components/{component_id}     update quantity, remove
///
/// /components                                          list (public), create (moderator)
/// /components/{id}                                     get (public), update, delete (moderator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/cooling-requests", cooling_requests::router())
        .nest("/components", components::router())
}
