pub mod auth;
pub mod components;
pub mod cooling_requests;
pub mod users;
