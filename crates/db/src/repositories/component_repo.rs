//! Repository for the `components` catalog table.

use coolreq_core::types::DbId;
use sqlx::PgPool;

use crate::models::component::{Component, CreateComponent, UpdateComponent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, tdp, image_url, is_active, created_at, updated_at";

/// Provides CRUD operations for catalog components.
pub struct ComponentRepo;

impl ComponentRepo {
    /// Insert a new component, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComponent) -> Result<Component, sqlx::Error> {
        let query = format!(
            "INSERT INTO components (title, description, tdp, image_url)
             VALUES ($1, COALESCE($2, ''), $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Component>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.tdp)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a component by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Component>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM components WHERE id = $1");
        sqlx::query_as::<_, Component>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List components in id order, optionally filtered by a
    /// case-insensitive title substring.
    pub async fn list(pool: &PgPool, title: Option<&str>) -> Result<Vec<Component>, sqlx::Error> {
        let pattern = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", escape_like(t)));
        let query = format!(
            "SELECT {COLUMNS} FROM components
             WHERE ($1::text IS NULL OR title ILIKE $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, Component>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// Update a component. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComponent,
    ) -> Result<Option<Component>, sqlx::Error> {
        let query = format!(
            "UPDATE components SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                tdp = COALESCE($4, tdp),
                image_url = COALESCE($5, image_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Component>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.tdp)
            .bind(&input.image_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a component. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while any request references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `ILIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
