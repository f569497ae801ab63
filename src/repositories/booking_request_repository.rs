//! Repository for booking requests and their resolution

use crate::database::Database;
use crate::error::RepositoryError;
use crate::models::{
    BookingRequest, BookingRequestDetails, BookingStatus, Decision, Page, PageRequest,
    PaymentObligation, Slot,
};
use crate::repositories::slot_repository::SLOT_COLUMNS;
use crate::repositories::PaymentRepository;
use rust_decimal::Decimal;
use sqlx::Result as SqlxResult;
use uuid::Uuid;

const REQUEST_COLUMNS: &str = "id, requester_id, owner_id, arena_id, slot_id, price, status, \
     created_by, created_at, resolved_at, requester_deleted, owner_deleted";

const DETAILS_QUERY: &str = r#"
    SELECT
        br.id, br.requester_id, br.owner_id, br.arena_id, br.slot_id, br.price, br.status,
        br.created_by, br.created_at, br.resolved_at, br.requester_deleted, br.owner_deleted,
        sl.slot_date, sl.start_time, sl.end_time
    FROM booking_requests br
    INNER JOIN slots sl ON sl.id = br.slot_id
"#;

/// Outcome of resolving a request
#[derive(Debug, Clone)]
pub struct Resolution {
    pub request: BookingRequest,
    /// The target slot as left by the decision
    pub slot: Slot,
    /// Present exactly when the decision was `Booked`
    pub payment: Option<PaymentObligation>,
}

/// Which party is hiding a request from their own view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Requester,
    Owner,
}

impl Party {
    fn deleted_column(self) -> &'static str {
        match self {
            Party::Requester => "requester_deleted",
            Party::Owner => "owner_deleted",
        }
    }

    fn account_of(self, request: &BookingRequest) -> i64 {
        match self {
            Party::Requester => request.requester_id,
            Party::Owner => request.owner_id,
        }
    }
}

pub struct BookingRequestRepository {
    db: Database,
}

impl BookingRequestRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Claim an open slot for `requester_id`.
    ///
    /// Locks the slot row so the open check, the duplicate check and the
    /// insert see one consistent state. Other requesters may still hold
    /// pending requests against the same slot; only resolution is exclusive.
    pub async fn create(
        &self,
        requester_id: i64,
        slot_id: Uuid,
    ) -> Result<BookingRequest, RepositoryError> {
        let mut tx = self.db.begin_write().await?;

        let slot = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1 FOR UPDATE"
        ))
        .bind(slot_id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(Slot::is_open)
        .ok_or_else(|| RepositoryError::NotFound("slot not found or no longer available".to_string()))?;

        // Snapshot: later price edits never touch this request
        let price: Decimal = sqlx::query_scalar("SELECT price FROM arenas WHERE id = $1")
            .bind(slot.arena_id)
            .fetch_one(&mut *tx)
            .await?;

        let already_requested: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM booking_requests
                WHERE requester_id = $1 AND slot_id = $2 AND NOT requester_deleted
            )
            "#,
        )
        .bind(requester_id)
        .bind(slot_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_requested {
            return Err(RepositoryError::Duplicate(
                "you have already requested this slot".to_string(),
            ));
        }

        let request = sqlx::query_as::<_, BookingRequest>(&format!(
            r#"
            INSERT INTO booking_requests (requester_id, owner_id, arena_id, slot_id, price, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $1)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(requester_id)
        .bind(slot.owner_id)
        .bind(slot.arena_id)
        .bind(slot_id)
        .bind(price)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Apply the owner's decision.
    ///
    /// Lock order is request row, then slot row. The slot is re-read under
    /// its lock, so when two pending requests for one slot are accepted at
    /// the same time the second sees `is_reserved` and fails.
    pub async fn resolve(
        &self,
        request_id: i64,
        owner_id: i64,
        decision: Decision,
    ) -> Result<Resolution, RepositoryError> {
        let mut tx = self.db.begin_write().await?;

        let mut request = sqlx::query_as::<_, BookingRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM booking_requests \
             WHERE id = $1 AND NOT owner_deleted \
             FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("booking request not found".to_string()))?;

        let mut slot = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1 FOR UPDATE"
        ))
        .bind(request.slot_id)
        .fetch_one(&mut *tx)
        .await?;

        let status = request.resolve(owner_id, decision, chrono::Utc::now().naive_utc())?;

        // Declining also requires an open slot; only booking applies the reservation
        let reserved = slot.state().reserve(request.requester_id)?;

        sqlx::query("UPDATE booking_requests SET status = $2, resolved_at = $3 WHERE id = $1")
            .bind(request.id)
            .bind(status.as_str())
            .bind(request.resolved_at)
            .execute(&mut *tx)
            .await?;

        let payment = if status == BookingStatus::Booked {
            slot.apply(reserved);
            sqlx::query("UPDATE slots SET is_reserved = $2, reserved_by = $3 WHERE id = $1")
                .bind(slot.id)
                .bind(slot.is_reserved)
                .bind(slot.reserved_by)
                .execute(&mut *tx)
                .await?;

            let payment =
                PaymentRepository::insert_obligation(&mut *tx, request.id, request.requester_id)
                    .await?;
            Some(payment)
        } else {
            None
        };

        tx.commit().await?;

        Ok(Resolution {
            request,
            slot,
            payment,
        })
    }

    /// Hide a request from one party's own listings. The other party's view
    /// and the request status are untouched.
    pub async fn hide_for(
        &self,
        request_id: i64,
        account_id: i64,
        party: Party,
    ) -> Result<BookingRequest, RepositoryError> {
        let column = party.deleted_column();
        let mut tx = self.db.begin_write().await?;

        let mut request = sqlx::query_as::<_, BookingRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM booking_requests \
             WHERE id = $1 AND NOT {column} \
             FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("booking request not found".to_string()))?;

        if party.account_of(&request) != account_id {
            return Err(RepositoryError::Forbidden(match party {
                Party::Requester => "only the requester can withdraw this request".to_string(),
                Party::Owner => "only the slot owner can hide this request".to_string(),
            }));
        }

        sqlx::query(&format!("UPDATE booking_requests SET {column} = TRUE WHERE id = $1"))
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        match party {
            Party::Requester => request.requester_deleted = true,
            Party::Owner => request.owner_deleted = true,
        }
        Ok(request)
    }

    pub async fn find_by_id(&self, id: i64) -> SqlxResult<Option<BookingRequest>> {
        sqlx::query_as::<_, BookingRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM booking_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
    }

    /// Every request ever made against a slot, hidden ones included
    pub async fn find_by_slot(&self, slot_id: Uuid) -> SqlxResult<Vec<BookingRequest>> {
        sqlx::query_as::<_, BookingRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM booking_requests WHERE slot_id = $1 ORDER BY id"
        ))
        .bind(slot_id)
        .fetch_all(self.db.pool())
        .await
    }

    /// Requests made by `requester_id` that they have not withdrawn
    pub async fn find_for_requester(
        &self,
        requester_id: i64,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> SqlxResult<Page<BookingRequestDetails>> {
        self.find_details(
            "br.requester_id = $1 AND NOT br.requester_deleted",
            requester_id,
            status,
            page,
        )
        .await
    }

    /// Requests addressed to `owner_id` that they have not hidden
    pub async fn find_for_owner(
        &self,
        owner_id: i64,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> SqlxResult<Page<BookingRequestDetails>> {
        self.find_details(
            "br.owner_id = $1 AND NOT br.owner_deleted",
            owner_id,
            status,
            page,
        )
        .await
    }

    async fn find_details(
        &self,
        scope: &str,
        account_id: i64,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> SqlxResult<Page<BookingRequestDetails>> {
        let status = status.map(|s| s.as_str());
        let filter = format!("WHERE {scope} AND ($2::TEXT IS NULL OR br.status = $2)");

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM booking_requests br {filter}"
        ))
        .bind(account_id)
        .bind(status)
        .fetch_one(self.db.pool())
        .await?;

        let page = page.normalized().clamp_to(total);

        let items = sqlx::query_as::<_, BookingRequestDetails>(&format!(
            "{DETAILS_QUERY} {filter} ORDER BY br.created_at DESC, br.id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(account_id)
        .bind(status)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        Ok(Page::new(items, total, page))
    }
}
