//! Domain models for the arena booking core.
//!
//! Row types for slots, booking requests and payment obligations, together
//! with the pure lifecycle transitions the repositories apply under lock.

pub mod arena;
pub mod booking_request;
pub mod page;
pub mod payment;
pub mod slot;

// Re-export all models for convenient access
pub use arena::ArenaListing;
pub use booking_request::{BookingRequest, BookingRequestDetails, BookingStatus, Decision};
pub use page::{DateRange, Page, PageRequest, PaymentPage};
pub use payment::{PaymentDetails, PaymentObligation};
pub use slot::{find_conflict, Slot, SlotInput, SlotState, TimeWindow, MAX_SLOTS_PER_BATCH};
