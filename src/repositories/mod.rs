pub mod arena_repository;
pub mod booking_request_repository;
pub mod payment_repository;
pub mod slot_repository;

// Re-export all repositories for convenient access
pub use arena_repository::ArenaRepository;
pub use booking_request_repository::{BookingRequestRepository, Party, Resolution};
pub use payment_repository::PaymentRepository;
pub use slot_repository::SlotRepository;
