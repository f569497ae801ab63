//! Repository for payment obligations

use crate::database::Database;
use crate::error::RepositoryError;
use crate::models::{Page, PageRequest, PaymentDetails, PaymentObligation};
use sqlx::{PgConnection, Result as SqlxResult};

const PAYMENT_COLUMNS: &str =
    "id, booking_request_id, payer_id, is_paid, paid_at, is_deleted, created_at";

const DETAILS_QUERY: &str = r#"
    SELECT
        p.id AS payment_id,
        p.booking_request_id,
        p.payer_id,
        br.owner_id,
        br.arena_id,
        sl.slot_date,
        sl.start_time,
        sl.end_time,
        br.price,
        p.is_paid,
        p.paid_at
    FROM payments p
    INNER JOIN booking_requests br ON br.id = p.booking_request_id
    INNER JOIN slots sl ON sl.id = br.slot_id
"#;

pub struct PaymentRepository {
    db: Database,
}

impl PaymentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Raise the obligation for a booked request inside the caller's transaction.
    /// `uq_payments_booking_request` turns a second insert into a unique violation.
    pub async fn insert_obligation(
        conn: &mut PgConnection,
        booking_request_id: i64,
        payer_id: i64,
    ) -> SqlxResult<PaymentObligation> {
        sqlx::query_as::<_, PaymentObligation>(&format!(
            r#"
            INSERT INTO payments (booking_request_id, payer_id)
            VALUES ($1, $2)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(booking_request_id)
        .bind(payer_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Mark an obligation paid. The row lock makes the paid check and the
    /// update one step, so two concurrent settlements cannot both succeed.
    pub async fn settle(
        &self,
        payment_id: i64,
        payer_id: i64,
    ) -> Result<PaymentObligation, RepositoryError> {
        let mut tx = self.db.begin_write().await?;

        let mut payment = sqlx::query_as::<_, PaymentObligation>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE id = $1 AND NOT is_deleted \
             FOR UPDATE"
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("payment not found".to_string()))?;

        payment.settle(payer_id, chrono::Utc::now().naive_utc())?;

        let settled = sqlx::query_as::<_, PaymentObligation>(&format!(
            r#"
            UPDATE payments
            SET is_paid = TRUE, paid_at = $2
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment.id)
        .bind(payment.paid_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(settled)
    }

    pub async fn find_by_id(&self, id: i64) -> SqlxResult<Option<PaymentObligation>> {
        sqlx::query_as::<_, PaymentObligation>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
    }

    pub async fn find_by_booking_request(
        &self,
        booking_request_id: i64,
    ) -> SqlxResult<Vec<PaymentObligation>> {
        sqlx::query_as::<_, PaymentObligation>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_request_id = $1 ORDER BY id"
        ))
        .bind(booking_request_id)
        .fetch_all(self.db.pool())
        .await
    }

    /// Obligations owed by `payer_id`
    pub async fn find_for_payer(
        &self,
        payer_id: i64,
        paid: Option<bool>,
        page: PageRequest,
    ) -> SqlxResult<Page<PaymentDetails>> {
        self.find_details("p.payer_id = $1", payer_id, paid, page).await
    }

    /// Obligations owed to `owner_id` for slots they published
    pub async fn find_for_owner(
        &self,
        owner_id: i64,
        paid: Option<bool>,
        page: PageRequest,
    ) -> SqlxResult<Page<PaymentDetails>> {
        self.find_details("br.owner_id = $1", owner_id, paid, page).await
    }

    async fn find_details(
        &self,
        scope: &str,
        account_id: i64,
        paid: Option<bool>,
        page: PageRequest,
    ) -> SqlxResult<Page<PaymentDetails>> {
        let filter = format!(
            "WHERE NOT p.is_deleted AND {scope} AND ($2::BOOLEAN IS NULL OR p.is_paid = $2)"
        );

        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*)
            FROM payments p
            INNER JOIN booking_requests br ON br.id = p.booking_request_id
            {filter}
            "#
        ))
        .bind(account_id)
        .bind(paid)
        .fetch_one(self.db.pool())
        .await?;

        let page = page.normalized().clamp_to(total);

        let items = sqlx::query_as::<_, PaymentDetails>(&format!(
            "{DETAILS_QUERY} {filter} ORDER BY sl.slot_date DESC, sl.start_time DESC LIMIT $3 OFFSET $4"
        ))
        .bind(account_id)
        .bind(paid)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        Ok(Page::new(items, total, page))
    }
}
