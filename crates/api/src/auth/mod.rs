//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation and validation.
//! - [`revocation`] -- server-side logout blacklist.

pub mod jwt;
pub mod password;
pub mod revocation;
