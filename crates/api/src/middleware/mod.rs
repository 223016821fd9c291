//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a non-revoked Bearer token.
//! - [`rbac::RequireModerator`] -- Additionally requires the moderator flag.

pub mod auth;
pub mod rbac;
