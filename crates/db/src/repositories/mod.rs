//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod component_repo;
pub mod cooling_request_repo;
pub mod revoked_token_repo;
pub mod user_repo;

pub use component_repo::ComponentRepo;
pub use cooling_request_repo::{CoolingRequestRepo, LifecycleError};
pub use revoked_token_repo::RevokedTokenRepo;
pub use user_repo::UserRepo;
