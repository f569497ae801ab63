//! Payment obligations raised when a booking request is accepted

use crate::error::DomainError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Unpaid debt owed by the requester of a booked request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentObligation {
    pub id: i64,
    pub booking_request_id: i64,
    pub payer_id: i64,
    pub is_paid: bool,
    pub paid_at: Option<NaiveDateTime>,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
}

impl PaymentObligation {
    /// Mark as paid. One-shot: a settled obligation never returns to unpaid.
    pub fn settle(&mut self, payer_id: i64, now: NaiveDateTime) -> Result<(), DomainError> {
        if self.payer_id != payer_id {
            return Err(DomainError::NotParty("only the payer can settle this payment"));
        }
        if self.is_paid {
            return Err(DomainError::AlreadyPaid);
        }

        self.is_paid = true;
        self.paid_at = Some(now);
        Ok(())
    }
}

/// Obligation joined with its request and slot, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentDetails {
    pub payment_id: i64,
    pub booking_request_id: i64,
    pub payer_id: i64,
    pub owner_id: i64,
    pub arena_id: i64,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<NaiveDateTime>,
}

impl PaymentDetails {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}
