//! Repository for published slots

use crate::database::Database;
use crate::error::RepositoryError;
use crate::models::{find_conflict, DateRange, Page, PageRequest, Slot, TimeWindow};
use crate::repositories::ArenaRepository;
use sqlx::Result as SqlxResult;
use uuid::Uuid;

pub(crate) const SLOT_COLUMNS: &str = "id, arena_id, stadium_id, owner_id, slot_date, start_time, end_time, \
     is_reserved, reserved_by, is_deleted, created_by, created_at";

pub struct SlotRepository {
    db: Database,
}

impl SlotRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a batch of windows for one arena, all or nothing.
    ///
    /// The arena row stays locked until commit, so a concurrent publish for
    /// the same arena runs its overlap check only after this batch is visible.
    pub async fn publish(
        &self,
        arena_id: i64,
        owner_id: i64,
        windows: &[TimeWindow],
    ) -> Result<Vec<Slot>, RepositoryError> {
        let mut tx = self.db.begin_write().await?;

        let arena = ArenaRepository::lock_owned(&mut *tx, arena_id, owner_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::NotFound("arena not found or you don't own this arena".to_string())
            })?;

        let mut dates: Vec<_> = windows.iter().map(|w| w.date).collect();
        dates.sort();
        dates.dedup();

        let existing = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots \
             WHERE arena_id = $1 AND slot_date = ANY($2) AND NOT is_deleted"
        ))
        .bind(arena_id)
        .bind(&dates)
        .fetch_all(&mut *tx)
        .await?;

        let existing: Vec<TimeWindow> = existing.iter().map(Slot::window).collect();
        if let Some(idx) = find_conflict(&existing, windows) {
            let w = &windows[idx];
            return Err(RepositoryError::InvalidState(format!(
                "overlapping time slot detected for {} {}-{}",
                w.date,
                w.start.format("%H:%M"),
                w.end.format("%H:%M")
            )));
        }

        let mut created = Vec::with_capacity(windows.len());
        for window in windows {
            let slot = sqlx::query_as::<_, Slot>(&format!(
                r#"
                INSERT INTO slots (id, arena_id, stadium_id, owner_id, slot_date, start_time, end_time, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $4)
                RETURNING {SLOT_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(arena.arena_id)
            .bind(arena.stadium_id)
            .bind(owner_id)
            .bind(window.date)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&mut *tx)
            .await?;

            created.push(slot);
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Soft-delete an unreserved slot owned by `owner_id`
    pub async fn retract(&self, slot_id: Uuid, owner_id: i64) -> Result<Slot, RepositoryError> {
        let mut tx = self.db.begin_write().await?;

        let mut slot = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots \
             WHERE id = $1 AND owner_id = $2 AND NOT is_deleted \
             FOR UPDATE"
        ))
        .bind(slot_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("slot not found or you don't own it".to_string()))?;

        let next = slot.state().retract()?;
        slot.apply(next);

        sqlx::query("UPDATE slots SET is_deleted = TRUE WHERE id = $1")
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(slot)
    }

    /// Find a slot by id, including retracted ones
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Slot>> {
        sqlx::query_as::<_, Slot>(&format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
    }

    /// All published slots of an arena, in calendar order
    pub async fn find_by_arena(&self, arena_id: i64) -> SqlxResult<Vec<Slot>> {
        sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots \
             WHERE arena_id = $1 AND NOT is_deleted \
             ORDER BY slot_date, start_time"
        ))
        .bind(arena_id)
        .fetch_all(self.db.pool())
        .await
    }

    /// Count published slots of an arena
    pub async fn count_by_arena(&self, arena_id: i64) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM slots WHERE arena_id = $1 AND NOT is_deleted",
        )
        .bind(arena_id)
        .fetch_one(self.db.pool())
        .await
    }

    /// Unreserved slots users can still request
    pub async fn find_open(
        &self,
        arena_id: Option<i64>,
        range: DateRange,
        page: PageRequest,
    ) -> SqlxResult<Page<Slot>> {
        let filter = "NOT is_deleted AND NOT is_reserved \
             AND ($1::BIGINT IS NULL OR arena_id = $1) \
             AND ($2::DATE IS NULL OR slot_date >= $2) \
             AND ($3::DATE IS NULL OR slot_date <= $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM slots WHERE {filter}"))
            .bind(arena_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_one(self.db.pool())
            .await?;

        let page = page.normalized().clamp_to(total);

        let items = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE {filter} \
             ORDER BY slot_date, start_time \
             LIMIT $4 OFFSET $5"
        ))
        .bind(arena_id)
        .bind(range.from)
        .bind(range.to)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        Ok(Page::new(items, total, page))
    }

    /// Slots an owner has published, optionally filtered by reservation
    pub async fn find_by_owner(
        &self,
        owner_id: i64,
        reserved: Option<bool>,
        range: DateRange,
        page: PageRequest,
    ) -> SqlxResult<Page<Slot>> {
        let filter = "owner_id = $1 AND NOT is_deleted \
             AND ($2::BOOLEAN IS NULL OR is_reserved = $2) \
             AND ($3::DATE IS NULL OR slot_date >= $3) \
             AND ($4::DATE IS NULL OR slot_date <= $4)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM slots WHERE {filter}"))
            .bind(owner_id)
            .bind(reserved)
            .bind(range.from)
            .bind(range.to)
            .fetch_one(self.db.pool())
            .await?;

        let page = page.normalized().clamp_to(total);

        let items = sqlx::query_as::<_, Slot>(&format!(
            "SELECT {SLOT_COLUMNS} FROM slots WHERE {filter} \
             ORDER BY created_at DESC, slot_date, start_time \
             LIMIT $5 OFFSET $6"
        ))
        .bind(owner_id)
        .bind(reserved)
        .bind(range.from)
        .bind(range.to)
        .bind(page.page_size)
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        Ok(Page::new(items, total, page))
    }
}
