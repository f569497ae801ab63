pub mod payment_ledger;
pub mod reservation_workflow;
pub mod slot_catalog;

pub use payment_ledger::PaymentLedger;
pub use reservation_workflow::ReservationWorkflow;
pub use slot_catalog::SlotCatalog;
