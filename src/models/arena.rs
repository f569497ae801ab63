use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registry view of an arena: who owns it and what it costs.
/// Arenas and stadiums are maintained by the registry, never by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArenaListing {
    pub arena_id: i64,
    pub stadium_id: i64,
    pub owner_id: i64,
    pub price: Decimal,
}
