mod helpers;

use arena_booking::models::*;
use arena_booking::repositories::ArenaRepository;
use arena_booking::{AppError, Caller};
use helpers::*;
use sqlx::PgPool;
use std::time::Duration;

// ============================================================================
// PUBLISH
// ============================================================================

#[sqlx::test]
async fn test_publish_batch(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;

    let slots = db
        .catalog()
        .publish_slots(
            &Caller::owner(OWNER_ID),
            arena.arena_id,
            &[
                SlotInput::new("2025-06-01", "08:00", "09:00"),
                SlotInput::new("2025-06-01", "09:00", "10:00"),
                SlotInput::new("2025-06-02", "08:00", "09:00"),
            ],
        )
        .await
        .expect("Failed to publish slots");

    assert_eq!(slots.len(), 3);
    for slot in &slots {
        assert_eq!(slot.arena_id, arena.arena_id);
        assert_eq!(slot.stadium_id, arena.stadium_id);
        assert_eq!(slot.owner_id, OWNER_ID);
        assert_eq!(slot.created_by, OWNER_ID);
        assert!(slot.is_open());
    }

    let listed = db.catalog().list_arena_slots(arena.arena_id).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(db.state.slot_repo.count_by_arena(arena.arena_id).await.unwrap(), 3);

    let listing = db
        .state
        .arena_repo
        .find_listing(arena.arena_id)
        .await
        .unwrap()
        .expect("arena should be listed");
    assert_eq!(listing.owner_id, OWNER_ID);
    assert_eq!(listing.price, price(40));
}

#[sqlx::test]
async fn test_publish_overlapping_existing_slot_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;
    publish_slot(&db, &arena, "10:00", "12:00").await;

    let result = db
        .catalog()
        .publish_slots(
            &Caller::owner(OWNER_ID),
            arena.arena_id,
            &[SlotInput::new("2025-06-01", "11:00", "13:00")],
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[sqlx::test]
async fn test_publish_touching_slots_accepted(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;
    publish_slot(&db, &arena, "10:00", "12:00").await;

    let result = db
        .catalog()
        .publish_slots(
            &Caller::owner(OWNER_ID),
            arena.arena_id,
            &[
                SlotInput::new("2025-06-01", "08:00", "10:00"),
                SlotInput::new("2025-06-01", "12:00", "13:00"),
            ],
        )
        .await;

    assert_eq!(result.unwrap().len(), 2);
}

#[sqlx::test]
async fn test_publish_is_all_or_nothing(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;

    // Third entry collides with the second
    let batch = [
        SlotInput::new("2025-06-01", "08:00", "09:00"),
        SlotInput::new("2025-06-01", "09:00", "10:00"),
        SlotInput::new("2025-06-01", "09:30", "10:30"),
        SlotInput::new("2025-06-01", "11:00", "12:00"),
        SlotInput::new("2025-06-01", "12:00", "13:00"),
    ];

    let result = db
        .catalog()
        .publish_slots(&Caller::owner(OWNER_ID), arena.arena_id, &batch)
        .await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));

    let listed = db.catalog().list_arena_slots(arena.arena_id).await.unwrap();
    assert!(listed.is_empty());
}

#[sqlx::test]
async fn test_publish_batch_size_validation(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;
    let owner = Caller::owner(OWNER_ID);

    let empty = db.catalog().publish_slots(&owner, arena.arena_id, &[]).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let eleven: Vec<_> = (8..19)
        .map(|h| SlotInput::new("2025-06-01", &format!("{:02}:00", h), &format!("{:02}:45", h)))
        .collect();
    let too_many = db.catalog().publish_slots(&owner, arena.arena_id, &eleven).await;
    assert!(matches!(too_many, Err(AppError::Validation(_))));

    let malformed = db
        .catalog()
        .publish_slots(&owner, arena.arena_id, &[SlotInput::new("2025-13-01", "08:00", "09:00")])
        .await;
    assert!(matches!(malformed, Err(AppError::Validation(_))));
}

#[sqlx::test]
async fn test_publish_on_foreign_arena_not_found(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;

    let result = db
        .catalog()
        .publish_slots(
            &Caller::owner(OTHER_OWNER_ID),
            arena.arena_id,
            &[SlotInput::new("2025-06-01", "08:00", "09:00")],
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let missing = db
        .catalog()
        .publish_slots(
            &Caller::owner(OWNER_ID),
            9_999,
            &[SlotInput::new("2025-06-01", "08:00", "09:00")],
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[sqlx::test]
async fn test_publish_requires_owner_role(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;

    let result = db
        .catalog()
        .publish_slots(
            &Caller::user(OWNER_ID),
            arena.arena_id,
            &[SlotInput::new("2025-06-01", "08:00", "09:00")],
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[sqlx::test]
async fn test_concurrent_overlapping_publish_single_winner(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;
    let owner = Caller::owner(OWNER_ID);

    let first = [SlotInput::new("2025-06-01", "10:00", "11:00")];
    let second = [SlotInput::new("2025-06-01", "10:30", "11:30")];

    let (a, b) = tokio::join!(
        db.catalog().publish_slots(&owner, arena.arena_id, &first),
        db.catalog().publish_slots(&owner, arena.arena_id, &second),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let listed = db.catalog().list_arena_slots(arena.arena_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

// ============================================================================
// RETRACT
// ============================================================================

#[sqlx::test]
async fn test_retract_slot(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fixtures = TestFixtures::create(&db).await;
    let owner = Caller::owner(OWNER_ID);

    let retracted = db
        .catalog()
        .retract_slot(&owner, fixtures.slot.id)
        .await
        .expect("Failed to retract slot");
    assert!(retracted.is_deleted);
    assert_eq!(retracted.state(), SlotState::Retracted);

    // Second retraction no longer finds the slot
    let again = db.catalog().retract_slot(&owner, fixtures.slot.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    // Retracted windows free the time range again
    publish_slot(&db, &fixtures.arena, "18:00", "19:00").await;
}

#[sqlx::test]
async fn test_retract_by_other_owner_not_found(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fixtures = TestFixtures::create(&db).await;

    let result = db
        .catalog()
        .retract_slot(&Caller::owner(OTHER_OWNER_ID), fixtures.slot.id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[sqlx::test]
async fn test_retract_reserved_slot_rejected(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let fixtures = TestFixtures::create(&db).await;

    let request = db
        .reservations()
        .request_slot(&Caller::user(USER_ID), fixtures.slot.id)
        .await
        .unwrap();
    db.reservations()
        .resolve(&Caller::owner(OWNER_ID), request.id, Decision::Booked)
        .await
        .unwrap();

    let result = db
        .catalog()
        .retract_slot(&Caller::owner(OWNER_ID), fixtures.slot.id)
        .await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

// ============================================================================
// LISTINGS
// ============================================================================

#[sqlx::test]
async fn test_list_open_slots_excludes_reserved_and_retracted(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;
    let owner = Caller::owner(OWNER_ID);

    let open = publish_slot(&db, &arena, "08:00", "09:00").await;
    let reserved = publish_slot(&db, &arena, "09:00", "10:00").await;
    let retracted = publish_slot(&db, &arena, "10:00", "11:00").await;

    let request = db
        .reservations()
        .request_slot(&Caller::user(USER_ID), reserved.id)
        .await
        .unwrap();
    db.reservations()
        .resolve(&owner, request.id, Decision::Booked)
        .await
        .unwrap();
    db.catalog().retract_slot(&owner, retracted.id).await.unwrap();

    let page = db
        .catalog()
        .list_open_slots(Some(arena.arena_id), DateRange::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].id, open.id);

    let reserved_only = db
        .catalog()
        .list_owner_slots(&owner, Some(true), DateRange::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(reserved_only.total_count, 1);
    assert_eq!(reserved_only.items[0].reserved_by, Some(USER_ID));
}

#[sqlx::test]
async fn test_list_open_slots_pagination_clamps(pool: PgPool) {
    let db = TestDatabase::from_pool(pool).await;
    let arena = create_arena(&db.pool, OWNER_ID, price(40)).await;

    let batch: Vec<_> = (8..13)
        .map(|h| SlotInput::new("2025-06-01", &format!("{:02}:00", h), &format!("{:02}:30", h)))
        .collect();
    db.catalog()
        .publish_slots(&Caller::owner(OWNER_ID), arena.arena_id, &batch)
        .await
        .unwrap();

    let page = db
        .catalog()
        .list_open_slots(None, DateRange::default(), PageRequest::new(9, 2))
        .await
        .unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page_number, 3);
    assert_eq!(page.items.len(), 1);
}

// ============================================================================
// LOCK CONTENTION
// ============================================================================

#[sqlx::test]
async fn test_publish_lock_does_not_block_requests(pool: PgPool) {
    let db = TestDatabase::with_lock_timeout(pool, Duration::from_millis(200)).await;
    let fixtures = TestFixtures::create(&db).await;

    // An in-flight publish on the same arena holds the arena row
    let mut publishing = db.pool.begin().await.unwrap();
    ArenaRepository::lock_owned(&mut *publishing, fixtures.arena.arena_id, OWNER_ID)
        .await
        .unwrap()
        .expect("owner should lock own arena");

    let request = db
        .reservations()
        .request_slot(&Caller::user(USER_ID), fixtures.slot.id)
        .await
        .expect("request should not wait on the arena lock");
    assert_eq!(request.arena_id, fixtures.arena.arena_id);

    // A second publish still has to wait its turn
    let blocked = db
        .catalog()
        .publish_slots(
            &Caller::owner(OWNER_ID),
            fixtures.arena.arena_id,
            &[SlotInput::new("2025-06-01", "20:00", "21:00")],
        )
        .await;
    assert!(matches!(blocked, Err(AppError::Transient(_))));

    publishing.rollback().await.unwrap();
}

#[sqlx::test]
async fn test_lock_timeout_surfaces_as_transient(pool: PgPool) {
    let db = TestDatabase::with_lock_timeout(pool, Duration::from_millis(200)).await;
    let fixtures = TestFixtures::create(&db).await;

    let mut holder = db.pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM slots WHERE id = $1 FOR UPDATE")
        .bind(fixtures.slot.id)
        .execute(&mut *holder)
        .await
        .unwrap();

    let err = db
        .catalog()
        .retract_slot(&Caller::owner(OWNER_ID), fixtures.slot.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Transient(_)), "got {:?}", err);
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 503);

    holder.rollback().await.unwrap();

    // Once the lock is released the same call goes through
    let retracted = db
        .catalog()
        .retract_slot(&Caller::owner(OWNER_ID), fixtures.slot.id)
        .await
        .unwrap();
    assert!(retracted.is_deleted);
}
