//! Repository for `cooling_requests` and their component ledger.
//!
//! Every lifecycle mutation runs in one transaction. The request row is
//! locked with `SELECT ... FOR UPDATE` before any guard is evaluated and
//! before link rows are touched, so concurrent mutations of the same request
//! serialise and always take locks in the same order.

use coolreq_core::cooling::{self, HeatSource, RoomGeometry};
use coolreq_core::lifecycle::{self, ResolveAction, TransitionError};
use coolreq_core::pagination::PageRequest;
use coolreq_core::status::RequestStatus;
use coolreq_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::cooling_request::{
    CartBadge, CoolingRequest, CoolingRequestDetail, CreatorRequestCount, DraftAddition,
    RequestComponentLine, RequestListFilter, UpdateRoom,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, status_id, created_at, formed_at, completed_at, deleted_at, \
                       creator_id, moderator_id, room_area, room_height, cooling_power";

/// Entity name used in not-found errors.
const ENTITY: &str = "CoolingRequest";

/// Failure of a lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A state-machine or ownership precondition did not hold.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The request (or referenced component) does not exist or is deleted.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides the cooling request lifecycle and ledger operations.
pub struct CoolingRequestRepo;

impl CoolingRequestRepo {
    // -----------------------------------------------------------------------
    // Draft
    // -----------------------------------------------------------------------

    /// Add a component to the creator's draft, creating the draft if needed.
    ///
    /// Adding a component that is already linked leaves the link unchanged
    /// and reports `added: false`. The component is marked active.
    pub async fn add_to_draft(
        pool: &PgPool,
        creator_id: DbId,
        component_id: DbId,
    ) -> Result<DraftAddition, LifecycleError> {
        let mut tx = pool.begin().await?;

        let component: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM components WHERE id = $1")
                .bind(component_id)
                .fetch_optional(&mut *tx)
                .await?;
        if component.is_none() {
            return Err(LifecycleError::NotFound {
                entity: "Component",
                id: component_id,
            });
        }

        let request_id = Self::obtain_draft(&mut tx, creator_id).await?;

        let inserted = sqlx::query(
            "INSERT INTO cooling_request_components (request_id, component_id, quantity)
             VALUES ($1, $2, 1)
             ON CONFLICT (request_id, component_id) DO NOTHING",
        )
        .bind(request_id)
        .bind(component_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE components SET is_active = true, updated_at = NOW() WHERE id = $1")
            .bind(component_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(DraftAddition {
            request_id,
            added: inserted.rows_affected() > 0,
        })
    }

    /// Return the creator's draft id, inserting a draft if none exists.
    ///
    /// The partial unique index makes a concurrent insert a no-op; the loser
    /// re-reads the winner's row.
    async fn obtain_draft(
        tx: &mut Transaction<'_, Postgres>,
        creator_id: DbId,
    ) -> Result<DbId, sqlx::Error> {
        let draft = RequestStatus::Draft.id();

        let created: Option<(DbId,)> = sqlx::query_as(
            "INSERT INTO cooling_requests (creator_id, status_id) VALUES ($1, $2)
             ON CONFLICT (creator_id) WHERE status_id = 1 DO NOTHING
             RETURNING id",
        )
        .bind(creator_id)
        .bind(draft)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some((id,)) = created {
            tracing::debug!(request_id = id, creator_id, "Created draft cooling request");
            return Ok(id);
        }

        let (id,): (DbId,) =
            sqlx::query_as("SELECT id FROM cooling_requests WHERE creator_id = $1 AND status_id = $2")
                .bind(creator_id)
                .bind(draft)
                .fetch_one(&mut **tx)
                .await?;
        Ok(id)
    }

    /// Find the creator's current draft, if any.
    pub async fn find_draft(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Option<CoolingRequest>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM cooling_requests WHERE creator_id = $1 AND status_id = $2");
        sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(creator_id)
            .bind(RequestStatus::Draft.id())
            .fetch_optional(pool)
            .await
    }

    /// The creator's draft id and its number of linked components.
    pub async fn cart(pool: &PgPool, creator_id: DbId) -> Result<CartBadge, sqlx::Error> {
        let row: Option<(DbId, i64)> = sqlx::query_as(
            "SELECT r.id, COUNT(l.component_id)
             FROM cooling_requests r
             LEFT JOIN cooling_request_components l ON l.request_id = r.id
             WHERE r.creator_id = $1 AND r.status_id = $2
             GROUP BY r.id",
        )
        .bind(creator_id)
        .bind(RequestStatus::Draft.id())
        .fetch_optional(pool)
        .await?;

        Ok(match row {
            Some((request_id, count)) => CartBadge {
                request_id: Some(request_id),
                count,
            },
            None => CartBadge::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch a non-deleted request with its ledger.
    ///
    /// With `owner_id` set, a request created by someone else is reported as
    /// absent.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
        owner_id: Option<DbId>,
    ) -> Result<Option<CoolingRequestDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cooling_requests
             WHERE id = $1 AND status_id <> $2 AND ($3::bigint IS NULL OR creator_id = $3)"
        );
        let request = sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(id)
            .bind(RequestStatus::Deleted.id())
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        let Some(request) = request else {
            return Ok(None);
        };

        let components = Self::list_lines(pool, request.id).await?;
        Ok(Some(CoolingRequestDetail {
            request,
            components,
        }))
    }

    /// Ledger lines of a request in component id order.
    pub async fn list_lines(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<RequestComponentLine>, sqlx::Error> {
        sqlx::query_as::<_, RequestComponentLine>(
            "SELECT l.component_id, c.title, c.description, c.tdp, c.image_url, l.quantity
             FROM cooling_request_components l
             JOIN components c ON c.id = l.component_id
             WHERE l.request_id = $1
             ORDER BY l.component_id",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    /// List listable requests matching `filter`, most recently formed first.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestListFilter,
        page: &PageRequest,
    ) -> Result<Vec<CoolingRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cooling_requests
             WHERE {}
             ORDER BY formed_at DESC NULLS LAST, id DESC
             LIMIT $5 OFFSET $6",
            list_where()
        );
        sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(filter.statuses.as_slice())
            .bind(filter.formed_from)
            .bind(filter.formed_before)
            .bind(filter.creator_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count listable requests matching `filter`.
    pub async fn count(pool: &PgPool, filter: &RequestListFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM cooling_requests WHERE {}", list_where());
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(filter.statuses.as_slice())
            .bind(filter.formed_from)
            .bind(filter.formed_before)
            .bind(filter.creator_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Per-creator counts of listable requests matching `filter`.
    pub async fn creator_counts(
        pool: &PgPool,
        filter: &RequestListFilter,
    ) -> Result<Vec<CreatorRequestCount>, sqlx::Error> {
        let query = format!(
            "SELECT creator_id, u.username, COUNT(*) AS request_count
             FROM cooling_requests
             JOIN users u ON u.id = creator_id
             WHERE {}
             GROUP BY creator_id, u.username
             ORDER BY request_count DESC, creator_id",
            list_where()
        );
        sqlx::query_as::<_, CreatorRequestCount>(&query)
            .bind(filter.statuses.as_slice())
            .bind(filter.formed_from)
            .bind(filter.formed_before)
            .bind(filter.creator_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Update room dimensions. Only supplied fields change; owner only.
    pub async fn update_room(
        pool: &PgPool,
        id: DbId,
        caller_id: DbId,
        input: &UpdateRoom,
    ) -> Result<CoolingRequest, LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::ensure_owner(request.creator_id, caller_id)?;

        let query = format!(
            "UPDATE cooling_requests SET
                room_area = COALESCE($2, room_area),
                room_height = COALESCE($3, room_height)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(id)
            .bind(input.room_area)
            .bind(input.room_height)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Move a draft to `Formed`. Creator only; room dimensions must be set.
    pub async fn form(
        pool: &PgPool,
        id: DbId,
        caller_id: DbId,
    ) -> Result<CoolingRequest, LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::check_form(
            status_of(&request)?,
            request.creator_id,
            caller_id,
            request.room_area,
            request.room_height,
        )?;

        let query = format!(
            "UPDATE cooling_requests SET status_id = $2, formed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let formed = sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(id)
            .bind(RequestStatus::Formed.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(formed)
    }

    /// Complete or reject a formed request on behalf of `moderator_id`.
    ///
    /// Completion computes the required cooling power from the live ledger.
    /// Either outcome releases every linked component; rejection stores no
    /// power.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        moderator_id: DbId,
        action: ResolveAction,
    ) -> Result<CoolingRequest, LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::check_resolve(status_of(&request)?)?;

        let cooling_power = match action {
            ResolveAction::Complete => {
                let room = RoomGeometry::from_optional(request.room_area, request.room_height)
                    .ok_or(TransitionError::MissingRoomGeometry)?;
                let sources = Self::lock_heat_sources(&mut tx, id).await?;
                Some(cooling::required_cooling_kw(&sources, room))
            }
            ResolveAction::Reject => None,
        };

        let query = format!(
            "UPDATE cooling_requests SET
                status_id = $2,
                moderator_id = $3,
                completed_at = NOW(),
                cooling_power = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let resolved = sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(id)
            .bind(action.target_status().id())
            .bind(moderator_id)
            .bind(cooling_power)
            .fetch_one(&mut *tx)
            .await?;

        Self::release_components(&mut tx, id).await?;

        tx.commit().await?;
        Ok(resolved)
    }

    /// Logically delete a draft or formed request; owner only.
    ///
    /// Linked components are released. Rows are never removed.
    pub async fn delete(pool: &PgPool, id: DbId, caller_id: DbId) -> Result<(), LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::ensure_owner(request.creator_id, caller_id)?;
        lifecycle::check_delete(status_of(&request)?)?;

        Self::mark_deleted(&mut tx, id).await?;
        Self::release_components(&mut tx, id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove a component from a request's ledger; owner only.
    ///
    /// The component is released. If no links remain the request is
    /// logically deleted; the return value reports whether that happened.
    pub async fn remove_component(
        pool: &PgPool,
        id: DbId,
        component_id: DbId,
        caller_id: DbId,
    ) -> Result<bool, LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::ensure_owner(request.creator_id, caller_id)?;
        lifecycle::check_ledger_editable(status_of(&request)?)?;

        let removed = sqlx::query(
            "DELETE FROM cooling_request_components WHERE request_id = $1 AND component_id = $2",
        )
        .bind(id)
        .bind(component_id)
        .execute(&mut *tx)
        .await?;
        if removed.rows_affected() == 0 {
            return Err(TransitionError::NotLinked {
                request_id: id,
                component_id,
            }
            .into());
        }

        sqlx::query("UPDATE components SET is_active = false, updated_at = NOW() WHERE id = $1")
            .bind(component_id)
            .execute(&mut *tx)
            .await?;

        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cooling_request_components WHERE request_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let emptied = remaining == 0;
        if emptied {
            Self::mark_deleted(&mut tx, id).await?;
        }

        tx.commit().await?;
        Ok(emptied)
    }

    /// Set the quantity of a ledger line; owner only.
    ///
    /// `None` validates ownership and state but changes nothing.
    pub async fn update_quantity(
        pool: &PgPool,
        id: DbId,
        component_id: DbId,
        caller_id: DbId,
        quantity: Option<i32>,
    ) -> Result<(), LifecycleError> {
        let mut tx = pool.begin().await?;
        let request = Self::lock(&mut tx, id).await?;
        lifecycle::ensure_owner(request.creator_id, caller_id)?;
        lifecycle::check_ledger_editable(status_of(&request)?)?;

        if let Some(quantity) = quantity {
            let updated = sqlx::query(
                "UPDATE cooling_request_components SET quantity = $3
                 WHERE request_id = $1 AND component_id = $2",
            )
            .bind(id)
            .bind(component_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(TransitionError::NotLinked {
                    request_id: id,
                    component_id,
                }
                .into());
            }
        }

        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock a non-deleted request row for the rest of the transaction.
    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<CoolingRequest, LifecycleError> {
        let query = format!(
            "SELECT {COLUMNS} FROM cooling_requests WHERE id = $1 AND status_id <> $2 FOR UPDATE"
        );
        sqlx::query_as::<_, CoolingRequest>(&query)
            .bind(id)
            .bind(RequestStatus::Deleted.id())
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(LifecycleError::NotFound { entity: ENTITY, id })
    }

    /// Lock the request's link rows and read the live TDP of each component.
    async fn lock_heat_sources(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Vec<HeatSource>, sqlx::Error> {
        let rows: Vec<(i32, i32)> = sqlx::query_as(
            "SELECT c.tdp, l.quantity
             FROM cooling_request_components l
             JOIN components c ON c.id = l.component_id
             WHERE l.request_id = $1
             ORDER BY l.component_id
             FOR UPDATE OF l",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tdp_watts, quantity)| HeatSource {
                tdp_watts,
                quantity,
            })
            .collect())
    }

    async fn mark_deleted(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cooling_requests SET status_id = $2, deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(RequestStatus::Deleted.id())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Mark every component linked to the request inactive.
    async fn release_components(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE components SET is_active = false, updated_at = NOW()
             WHERE id IN (SELECT component_id FROM cooling_request_components WHERE request_id = $1)",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Shared `WHERE` clause for listings, binding `$1` statuses, `$2`/`$3` the
/// formed-at range and `$4` the creator scope.
fn list_where() -> String {
    format!(
        "status_id NOT IN ({draft}, {deleted})
         AND (cardinality($1::smallint[]) = 0 OR status_id = ANY($1))
         AND ($2::timestamptz IS NULL OR formed_at >= $2)
         AND ($3::timestamptz IS NULL OR formed_at < $3)
         AND ($4::bigint IS NULL OR creator_id = $4)",
        draft = RequestStatus::Draft.id(),
        deleted = RequestStatus::Deleted.id(),
    )
}

fn status_of(request: &CoolingRequest) -> Result<RequestStatus, sqlx::Error> {
    request.status().ok_or_else(|| {
        sqlx::Error::Protocol(format!(
            "cooling request {} has unknown status_id {}",
            request.id, request.status_id
        ))
    })
}
