use crate::error::DomainError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// Booking request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Booked,
    Declined,
}

/// Owner's answer to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Booked,
    Declined,
}

impl BookingStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "booked" => Ok(BookingStatus::Booked),
            "declined" => Ok(BookingStatus::Declined),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Booked => "booked",
            BookingStatus::Declined => "declined",
        }
    }

    /// The only transition out of `Pending`; terminal states reject everything
    pub fn resolve(self, decision: Decision) -> Result<BookingStatus, DomainError> {
        match self {
            BookingStatus::Pending => Ok(decision.into()),
            terminal => Err(DomainError::AlreadyResolved(terminal.as_str())),
        }
    }
}

impl From<Decision> for BookingStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Booked => BookingStatus::Booked,
            Decision::Declined => BookingStatus::Declined,
        }
    }
}

/// BookingRequest model: one account's claim on one slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    pub arena_id: i64,
    pub slot_id: Uuid,
    /// Arena price at the time the request was made
    pub price: Decimal,
    pub status: BookingStatus,
    pub created_by: i64,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub requester_deleted: bool,
    pub owner_deleted: bool,
}

impl BookingRequest {
    /// Apply the owner's decision, enforcing who may decide and that it happens once
    pub fn resolve(
        &mut self,
        owner_id: i64,
        decision: Decision,
        now: NaiveDateTime,
    ) -> Result<BookingStatus, DomainError> {
        if self.owner_id != owner_id {
            return Err(DomainError::NotParty("only the slot owner can resolve this request"));
        }

        self.status = self.status.resolve(decision)?;
        self.resolved_at = Some(now);
        Ok(self.status)
    }

    pub fn is_visible_to_requester(&self) -> bool {
        !self.requester_deleted
    }

    pub fn is_visible_to_owner(&self) -> bool {
        !self.owner_deleted
    }
}

impl<'r> FromRow<'r, PgRow> for BookingRequest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = BookingStatus::from_str(&status).map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            requester_id: row.try_get("requester_id")?,
            owner_id: row.try_get("owner_id")?,
            arena_id: row.try_get("arena_id")?,
            slot_id: row.try_get("slot_id")?,
            price: row.try_get("price")?,
            status,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            resolved_at: row.try_get("resolved_at")?,
            requester_deleted: row.try_get("requester_deleted")?,
            owner_deleted: row.try_get("owner_deleted")?,
        })
    }
}

/// Request joined with the slot it targets, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequestDetails {
    pub request: BookingRequest,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl<'r> FromRow<'r, PgRow> for BookingRequestDetails {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            request: BookingRequest::from_row(row)?,
            slot_date: row.try_get("slot_date")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
        })
    }
}
