use crate::database::Database;
use crate::models::ArenaListing;
use sqlx::{PgConnection, Result as SqlxResult};

const LISTING_QUERY: &str = r#"
    SELECT a.id AS arena_id, a.stadium_id, s.owner_id, a.price
    FROM arenas a
    INNER JOIN stadiums s ON s.id = a.stadium_id
"#;

/// Read-only access to the stadium/arena registry
pub struct ArenaRepository {
    db: Database,
}

impl ArenaRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve arena → stadium → owner and the current price
    pub async fn find_listing(&self, arena_id: i64) -> SqlxResult<Option<ArenaListing>> {
        sqlx::query_as::<_, ArenaListing>(&format!("{LISTING_QUERY} WHERE a.id = $1"))
            .bind(arena_id)
            .fetch_optional(self.db.pool())
            .await
    }

    /// Lock the arena row for the rest of the caller's transaction, provided
    /// `owner_id` owns it through its stadium. Publishes against one arena
    /// serialize on this lock; `NO KEY UPDATE` still admits the key-share
    /// locks taken by foreign-key checks on `booking_requests.arena_id`.
    pub async fn lock_owned(
        conn: &mut PgConnection,
        arena_id: i64,
        owner_id: i64,
    ) -> SqlxResult<Option<ArenaListing>> {
        sqlx::query_as::<_, ArenaListing>(&format!(
            "{LISTING_QUERY} WHERE a.id = $1 AND s.owner_id = $2 FOR NO KEY UPDATE OF a"
        ))
        .bind(arena_id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
    }
}
