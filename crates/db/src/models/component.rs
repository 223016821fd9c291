//! Catalog component model and DTOs.

use coolreq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `components` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Component {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// Thermal design power of one unit, in watts.
    pub tdp: i32,
    pub image_url: Option<String>,
    /// Set while the component sits in an open request.
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a catalog component.
#[derive(Debug, Deserialize)]
pub struct CreateComponent {
    pub title: String,
    pub description: Option<String>,
    pub tdp: i32,
    pub image_url: Option<String>,
}

/// DTO for updating a catalog component. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateComponent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tdp: Option<i32>,
    pub image_url: Option<String>,
}
