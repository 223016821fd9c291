//! Domain types and pure business rules for the cooling request service.
//!
//! This crate has no I/O. Everything here is shared by the repository layer
//! (`coolreq-db`) and the HTTP layer (`coolreq-api`).

pub mod cooling;
pub mod error;
pub mod lifecycle;
pub mod pagination;
pub mod status;
pub mod types;
pub mod validation;
