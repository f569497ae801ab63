#![allow(dead_code)]

use arena_booking::database::Database;
use arena_booking::models::*;
use arena_booking::services::{PaymentLedger, ReservationWorkflow, SlotCatalog};
use arena_booking::{AppState, Caller};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::time::Duration;

pub const OWNER_ID: i64 = 100;
pub const OTHER_OWNER_ID: i64 = 200;
pub const USER_ID: i64 = 1;
pub const OTHER_USER_ID: i64 = 2;

/// Test database wired the way the service wires it
pub struct TestDatabase {
    pub pool: PgPool,
    pub state: AppState,
}

impl TestDatabase {
    /// Create TestDatabase from an existing pool (useful with sqlx::test)
    pub async fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: pool.clone(),
            state: AppState::new(Database::new(pool)),
        }
    }

    /// Same wiring with a short lock wait, for contention tests
    pub async fn with_lock_timeout(pool: PgPool, lock_timeout: Duration) -> Self {
        Self {
            pool: pool.clone(),
            state: AppState::new(Database::with_lock_timeout(pool, lock_timeout)),
        }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.state.slot_catalog
    }

    pub fn reservations(&self) -> &ReservationWorkflow {
        &self.state.reservations
    }

    pub fn payments(&self) -> &PaymentLedger {
        &self.state.payments
    }
}

/// Insert a stadium and one arena for `owner_id` straight into the registry tables
pub async fn create_arena(pool: &PgPool, owner_id: i64, price: Decimal) -> ArenaListing {
    let stadium_id: i64 = sqlx::query_scalar(
        "INSERT INTO stadiums (owner_id, name, location) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner_id)
    .bind("Test Stadium")
    .bind("Downtown")
    .fetch_one(pool)
    .await
    .expect("Failed to create stadium");

    let arena_id: i64 = sqlx::query_scalar(
        "INSERT INTO arenas (stadium_id, name, sport_type, price) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(stadium_id)
    .bind("Court 1")
    .bind("futsal")
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("Failed to create arena");

    ArenaListing {
        arena_id,
        stadium_id,
        owner_id,
        price,
    }
}

/// Publish a single slot on `2025-06-01` and return it
pub async fn publish_slot(
    db: &TestDatabase,
    arena: &ArenaListing,
    start: &str,
    end: &str,
) -> Slot {
    let mut slots = db
        .catalog()
        .publish_slots(
            &Caller::owner(arena.owner_id),
            arena.arena_id,
            &[SlotInput::new("2025-06-01", start, end)],
        )
        .await
        .expect("Failed to publish slot");
    slots.remove(0)
}

/// Test data fixtures: one priced arena with one open slot
pub struct TestFixtures {
    pub arena: ArenaListing,
    pub slot: Slot,
}

impl TestFixtures {
    pub async fn create(db: &TestDatabase) -> Self {
        let arena = create_arena(&db.pool, OWNER_ID, Decimal::new(5000, 2)).await;
        let slot = publish_slot(db, &arena, "18:00", "19:00").await;
        Self { arena, slot }
    }
}

pub fn price(units: i64) -> Decimal {
    Decimal::new(units * 100, 2)
}
