//! Integration tests for the cooling request lifecycle against a real database.
//!
//! Covers draft uniqueness, idempotent ledger adds, formation guards,
//! resolution (power computation and component release), logical deletion
//! and the cascading delete when the last link is removed.

use assert_matches::assert_matches;
use coolreq_core::lifecycle::{ResolveAction, TransitionError};
use coolreq_core::status::RequestStatus;
use coolreq_core::types::Timestamp;
use coolreq_db::models::component::{CreateComponent, UpdateComponent};
use coolreq_db::models::cooling_request::UpdateRoom;
use coolreq_db::models::user::CreateUser;
use coolreq_db::repositories::{ComponentRepo, CoolingRequestRepo, LifecycleError, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: format!("{username} test"),
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_component(pool: &PgPool, title: &str, tdp: i32) -> i64 {
    ComponentRepo::create(
        pool,
        &CreateComponent {
            title: title.to_string(),
            description: None,
            tdp,
            image_url: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn status_of(pool: &PgPool, id: i64) -> i16 {
    let (status,): (i16,) = sqlx::query_as("SELECT status_id FROM cooling_requests WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap();
    status
}

async fn is_active(pool: &PgPool, component_id: i64) -> bool {
    ComponentRepo::find_by_id(pool, component_id)
        .await
        .unwrap()
        .unwrap()
        .is_active
}

/// Draft with a 50 m² × 3 m room, ready to form.
async fn draft_with_room(pool: &PgPool, creator: i64, components: &[i64]) -> i64 {
    let mut request_id = 0;
    for &component in components {
        request_id = CoolingRequestRepo::add_to_draft(pool, creator, component)
            .await
            .unwrap()
            .request_id;
    }
    CoolingRequestRepo::update_room(
        pool,
        request_id,
        creator,
        &UpdateRoom {
            room_area: Some(50.0),
            room_height: Some(3.0),
        },
    )
    .await
    .unwrap();
    request_id
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_add_to_draft_reuses_single_draft(pool: PgPool) {
    let user = new_user(&pool, "alice").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;

    let first = CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();
    let second = CoolingRequestRepo::add_to_draft(&pool, user, gpu).await.unwrap();

    assert_eq!(first.request_id, second.request_id);
    assert!(first.added && second.added);

    let (drafts,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM cooling_requests WHERE creator_id = $1 AND status_id = 1",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(drafts, 1);
    assert!(is_active(&pool, cpu).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_first_adds_share_one_draft(pool: PgPool) {
    let user = new_user(&pool, "alex").await;
    let mut components = Vec::new();
    for n in 0..8 {
        components.push(new_component(&pool, &format!("Part {n}"), 100).await);
    }

    let handles: Vec<_> = components
        .iter()
        .map(|&component| {
            let pool = pool.clone();
            tokio::spawn(async move {
                CoolingRequestRepo::add_to_draft(&pool, user, component).await
            })
        })
        .collect();

    let mut request_ids = Vec::new();
    for handle in handles {
        let addition = handle.await.unwrap().expect("every concurrent add should succeed");
        assert!(addition.added);
        request_ids.push(addition.request_id);
    }
    request_ids.dedup();
    assert_eq!(request_ids.len(), 1, "all adds must land in the same draft");

    let (drafts,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM cooling_requests WHERE creator_id = $1 AND status_id = 1",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(drafts, 1);

    let lines = CoolingRequestRepo::list_lines(&pool, request_ids[0]).await.unwrap();
    assert_eq!(lines.len(), components.len());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_same_component_twice_is_idempotent(pool: PgPool) {
    let user = new_user(&pool, "bob").await;
    let cpu = new_component(&pool, "CPU", 300).await;

    let first = CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();
    CoolingRequestRepo::update_quantity(&pool, first.request_id, cpu, user, Some(4))
        .await
        .unwrap();

    let again = CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();
    assert!(!again.added);

    let lines = CoolingRequestRepo::list_lines(&pool, first.request_id)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 4, "existing link must be left unchanged");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_unknown_component_is_not_found(pool: PgPool) {
    let user = new_user(&pool, "carol").await;
    let result = CoolingRequestRepo::add_to_draft(&pool, user, 9999).await;
    assert_matches!(
        result,
        Err(LifecycleError::NotFound {
            entity: "Component",
            id: 9999
        })
    );
    assert!(CoolingRequestRepo::find_draft(&pool, user).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cart_badge(pool: PgPool) {
    let user = new_user(&pool, "dave").await;
    let empty = CoolingRequestRepo::cart(&pool, user).await.unwrap();
    assert_eq!(empty.request_id, None);
    assert_eq!(empty.count, 0);

    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;
    CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();
    let added = CoolingRequestRepo::add_to_draft(&pool, user, gpu).await.unwrap();

    let cart = CoolingRequestRepo::cart(&pool, user).await.unwrap();
    assert_eq!(cart.request_id, Some(added.request_id));
    assert_eq!(cart.count, 2);
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_form_requires_room_geometry(pool: PgPool) {
    let user = new_user(&pool, "erin").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let draft = CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();

    let result = CoolingRequestRepo::form(&pool, draft.request_id, user).await;
    assert_matches!(
        result,
        Err(LifecycleError::Transition(TransitionError::MissingRoomGeometry))
    );
    assert_eq!(status_of(&pool, draft.request_id).await, RequestStatus::Draft.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_form_by_non_creator_fails(pool: PgPool) {
    let owner = new_user(&pool, "frank").await;
    let other = new_user(&pool, "grace").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, owner, &[cpu]).await;

    let result = CoolingRequestRepo::form(&pool, request, other).await;
    assert_matches!(
        result,
        Err(LifecycleError::Transition(TransitionError::NotCreator))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_form_sets_status_and_timestamp(pool: PgPool) {
    let user = new_user(&pool, "heidi").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, user, &[cpu]).await;

    let formed = CoolingRequestRepo::form(&pool, request, user).await.unwrap();
    assert_eq!(formed.status(), Some(RequestStatus::Formed));
    assert!(formed.formed_at.is_some());

    let again = CoolingRequestRepo::form(&pool, request, user).await;
    assert_matches!(
        again,
        Err(LifecycleError::Transition(TransitionError::NotDraft(RequestStatus::Formed)))
    );

    // A new add opens a fresh draft.
    let next = CoolingRequestRepo::add_to_draft(&pool, user, cpu).await.unwrap();
    assert_ne!(next.request_id, request);
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_complete_computes_power_and_releases_components(pool: PgPool) {
    let user = new_user(&pool, "ivan").await;
    let moderator = new_user(&pool, "judy").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;
    let request = draft_with_room(&pool, user, &[cpu, gpu]).await;
    CoolingRequestRepo::update_quantity(&pool, request, cpu, user, Some(2))
        .await
        .unwrap();
    CoolingRequestRepo::update_quantity(&pool, request, gpu, user, Some(2))
        .await
        .unwrap();
    CoolingRequestRepo::form(&pool, request, user).await.unwrap();

    let done = CoolingRequestRepo::resolve(&pool, request, moderator, ResolveAction::Complete)
        .await
        .unwrap();

    assert_eq!(done.status(), Some(RequestStatus::Completed));
    assert_eq!(done.moderator_id, Some(moderator));
    assert!(done.completed_at.is_some());
    let power = done.cooling_power.unwrap();
    assert!((power - 1.26).abs() < 1e-9, "got {power}");
    assert!(!is_active(&pool, cpu).await);
    assert!(!is_active(&pool, gpu).await);

    // Links are kept after resolution.
    assert_eq!(
        CoolingRequestRepo::list_lines(&pool, request).await.unwrap().len(),
        2
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reject_releases_components_without_power(pool: PgPool) {
    let user = new_user(&pool, "ken").await;
    let moderator = new_user(&pool, "lena").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, user, &[cpu]).await;
    CoolingRequestRepo::form(&pool, request, user).await.unwrap();
    assert!(is_active(&pool, cpu).await);

    let rejected = CoolingRequestRepo::resolve(&pool, request, moderator, ResolveAction::Reject)
        .await
        .unwrap();

    assert_eq!(rejected.status(), Some(RequestStatus::Rejected));
    assert_eq!(rejected.cooling_power, None);
    assert_eq!(rejected.moderator_id, Some(moderator));
    assert!(rejected.completed_at.is_some());
    assert!(!is_active(&pool, cpu).await);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_complete_uses_ledger_as_of_resolution(pool: PgPool) {
    let user = new_user(&pool, "kim").await;
    let moderator = new_user(&pool, "leo").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;
    let request = draft_with_room(&pool, user, &[cpu, gpu]).await;

    // 300 W + 150 W at formation time.
    CoolingRequestRepo::form(&pool, request, user).await.unwrap();

    // 2 x 300 W + 300 W = 0.9 kW by the time the moderator decides.
    CoolingRequestRepo::update_quantity(&pool, request, cpu, user, Some(2))
        .await
        .unwrap();
    ComponentRepo::update(
        &pool,
        gpu,
        &UpdateComponent {
            tdp: Some(300),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    let done = CoolingRequestRepo::resolve(&pool, request, moderator, ResolveAction::Complete)
        .await
        .unwrap();
    let power = done.cooling_power.unwrap();
    assert!((power - 1.26).abs() < 1e-9, "got {power}");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resolve_non_formed_leaves_row_unchanged(pool: PgPool) {
    let user = new_user(&pool, "mallory").await;
    let moderator = new_user(&pool, "nina").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, user, &[cpu]).await;

    let result =
        CoolingRequestRepo::resolve(&pool, request, moderator, ResolveAction::Complete).await;
    assert_matches!(
        result,
        Err(LifecycleError::Transition(TransitionError::NotFormed(RequestStatus::Draft)))
    );

    let detail = CoolingRequestRepo::find_detail(&pool, request, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.request.status(), Some(RequestStatus::Draft));
    assert_eq!(detail.request.moderator_id, None);
    assert_eq!(detail.request.cooling_power, None);
    assert!(is_active(&pool, cpu).await);
}

// ---------------------------------------------------------------------------
// Delete and ledger edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_is_logical_and_owner_only(pool: PgPool) {
    let owner = new_user(&pool, "oscar").await;
    let other = new_user(&pool, "peggy").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, owner, &[cpu]).await;
    CoolingRequestRepo::form(&pool, request, owner).await.unwrap();

    let denied = CoolingRequestRepo::delete(&pool, request, other).await;
    assert_matches!(
        denied,
        Err(LifecycleError::Transition(TransitionError::NotOwner))
    );

    CoolingRequestRepo::delete(&pool, request, owner).await.unwrap();
    assert_eq!(status_of(&pool, request).await, RequestStatus::Deleted.id());
    assert!(!is_active(&pool, cpu).await);

    let (formed_at, deleted_at): (Option<Timestamp>, Option<Timestamp>) =
        sqlx::query_as("SELECT formed_at, deleted_at FROM cooling_requests WHERE id = $1")
            .bind(request)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(formed_at.is_some(), "deletion must not clear formed_at");
    assert!(deleted_at.is_some());

    assert!(CoolingRequestRepo::find_detail(&pool, request, None)
        .await
        .unwrap()
        .is_none());
    assert_matches!(
        CoolingRequestRepo::delete(&pool, request, owner).await,
        Err(LifecycleError::NotFound { .. })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_removing_last_link_deletes_request(pool: PgPool) {
    let user = new_user(&pool, "quinn").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;
    let request = draft_with_room(&pool, user, &[cpu, gpu]).await;

    let emptied = CoolingRequestRepo::remove_component(&pool, request, cpu, user)
        .await
        .unwrap();
    assert!(!emptied);
    assert!(!is_active(&pool, cpu).await);
    assert_eq!(status_of(&pool, request).await, RequestStatus::Draft.id());

    let emptied = CoolingRequestRepo::remove_component(&pool, request, gpu, user)
        .await
        .unwrap();
    assert!(emptied);
    assert_eq!(status_of(&pool, request).await, RequestStatus::Deleted.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_remove_unlinked_component_fails(pool: PgPool) {
    let user = new_user(&pool, "rupert").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let gpu = new_component(&pool, "GPU", 150).await;
    let request = draft_with_room(&pool, user, &[cpu]).await;

    let result = CoolingRequestRepo::remove_component(&pool, request, gpu, user).await;
    assert_matches!(
        result,
        Err(LifecycleError::Transition(TransitionError::NotLinked { component_id, .. }))
            if component_id == gpu
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ledger_frozen_after_resolution(pool: PgPool) {
    let user = new_user(&pool, "sybil").await;
    let moderator = new_user(&pool, "trent").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, user, &[cpu]).await;
    CoolingRequestRepo::form(&pool, request, user).await.unwrap();
    CoolingRequestRepo::resolve(&pool, request, moderator, ResolveAction::Reject)
        .await
        .unwrap();

    assert_matches!(
        CoolingRequestRepo::update_quantity(&pool, request, cpu, user, Some(3)).await,
        Err(LifecycleError::Transition(TransitionError::NotEditable(RequestStatus::Rejected)))
    );
    assert_matches!(
        CoolingRequestRepo::remove_component(&pool, request, cpu, user).await,
        Err(LifecycleError::Transition(TransitionError::NotEditable(_)))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_room_is_partial_and_owner_only(pool: PgPool) {
    let owner = new_user(&pool, "uma").await;
    let other = new_user(&pool, "victor").await;
    let cpu = new_component(&pool, "CPU", 300).await;
    let request = draft_with_room(&pool, owner, &[cpu]).await;

    let updated = CoolingRequestRepo::update_room(
        &pool,
        request,
        owner,
        &UpdateRoom {
            room_area: None,
            room_height: Some(2.5),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.room_area, Some(50.0));
    assert_eq!(updated.room_height, Some(2.5));

    let denied =
        CoolingRequestRepo::update_room(&pool, request, other, &UpdateRoom::default()).await;
    assert_matches!(
        denied,
        Err(LifecycleError::Transition(TransitionError::NotOwner))
    );
}
