//! Published availability windows and their reservation lifecycle

use crate::error::DomainError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum number of slots accepted by a single publish call
pub const MAX_SLOTS_PER_BATCH: usize = 10;

/// Slot as submitted by an owner, before parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInput {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl SlotInput {
    pub fn new(date: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            date: date.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    /// Parse into a validated window: `YYYY-MM-DD` and `HH:MM` (or `HH:MM:SS`)
    pub fn parse(&self) -> Result<TimeWindow, String> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| format!("invalid date format: {}", self.date))?;
        let start = parse_time(&self.start_time)
            .ok_or_else(|| format!("invalid start time format: {}", self.start_time))?;
        let end = parse_time(&self.end_time)
            .ok_or_else(|| format!("invalid end time format: {}", self.end_time))?;

        TimeWindow::new(date, start, end)
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Half-open `[start, end)` interval on one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if start >= end {
            return Err(format!(
                "start time {} must be earlier than end time {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ));
        }
        Ok(Self { date, start, end })
    }

    /// Touching windows (one ends where the other starts) do not overlap
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.date == other.date && self.start < other.end && self.end > other.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// First candidate (in submission order) that overlaps an existing window or
/// an earlier candidate of the same batch
pub fn find_conflict(existing: &[TimeWindow], candidates: &[TimeWindow]) -> Option<usize> {
    candidates.iter().enumerate().find_map(|(idx, candidate)| {
        let clashes_existing = existing.iter().any(|w| w.overlaps(candidate));
        let clashes_batch = candidates[..idx].iter().any(|w| w.overlaps(candidate));
        (clashes_existing || clashes_batch).then_some(idx)
    })
}

/// Reservation state of a slot, derived from its persisted flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Open,
    Reserved { by: i64 },
    Retracted,
}

impl SlotState {
    /// Promise the slot to `requester`. Only an open slot can be reserved.
    pub fn reserve(self, requester: i64) -> Result<SlotState, DomainError> {
        match self {
            SlotState::Open => Ok(SlotState::Reserved { by: requester }),
            SlotState::Reserved { .. } => Err(DomainError::SlotAlreadyReserved),
            SlotState::Retracted => Err(DomainError::SlotRetracted),
        }
    }

    /// Withdraw the slot from publication. Reserved slots stay published.
    pub fn retract(self) -> Result<SlotState, DomainError> {
        match self {
            SlotState::Open => Ok(SlotState::Retracted),
            SlotState::Reserved { .. } => Err(DomainError::RetractReserved),
            SlotState::Retracted => Err(DomainError::SlotRetracted),
        }
    }
}

/// Slot model representing a bookable window on one arena
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slot {
    pub id: Uuid,
    pub arena_id: i64,
    pub stadium_id: i64,
    pub owner_id: i64,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_reserved: bool,
    pub reserved_by: Option<i64>,
    pub is_deleted: bool,
    pub created_by: i64,
    pub created_at: NaiveDateTime,
}

impl Slot {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            date: self.slot_date,
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn state(&self) -> SlotState {
        if self.is_deleted {
            SlotState::Retracted
        } else if self.is_reserved {
            // reserved_by is NOT NULL whenever is_reserved (slots_reserved_by check)
            SlotState::Reserved {
                by: self.reserved_by.unwrap_or_default(),
            }
        } else {
            SlotState::Open
        }
    }

    /// Write a state produced by a `SlotState` transition back onto the row
    pub fn apply(&mut self, state: SlotState) {
        self.reserved_by = match state {
            SlotState::Reserved { by } => Some(by),
            _ => None,
        };
        self.is_reserved = self.reserved_by.is_some();
        self.is_deleted = state == SlotState::Retracted;
    }

    pub fn is_open(&self) -> bool {
        self.state() == SlotState::Open
    }
}
