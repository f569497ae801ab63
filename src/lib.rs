//! Arena Booking Core Library
//!
//! Slot publication, booking-request resolution and payment settlement
//! for bookable sports arenas, backed by Postgres.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use auth::{Caller, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use services::{PaymentLedger, ReservationWorkflow, SlotCatalog};
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub database: Database,
    pub arena_repo: Arc<ArenaRepository>,
    pub slot_repo: Arc<SlotRepository>,
    pub request_repo: Arc<BookingRequestRepository>,
    pub payment_repo: Arc<PaymentRepository>,
    pub slot_catalog: SlotCatalog,
    pub reservations: ReservationWorkflow,
    pub payments: PaymentLedger,
}

impl AppState {
    /// Wire repositories and services over a shared database handle
    pub fn new(database: Database) -> Self {
        let arena_repo = Arc::new(ArenaRepository::new(database.clone()));
        let slot_repo = Arc::new(SlotRepository::new(database.clone()));
        let request_repo = Arc::new(BookingRequestRepository::new(database.clone()));
        let payment_repo = Arc::new(PaymentRepository::new(database.clone()));

        Self {
            slot_catalog: SlotCatalog::new(slot_repo.clone()),
            reservations: ReservationWorkflow::new(request_repo.clone()),
            payments: PaymentLedger::new(payment_repo.clone()),
            database,
            arena_repo,
            slot_repo,
            request_repo,
            payment_repo,
        }
    }
}
