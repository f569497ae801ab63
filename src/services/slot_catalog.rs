use crate::auth::{Caller, Role};
use crate::error::{AppError, AppResult};
use crate::models::{DateRange, Page, PageRequest, Slot, SlotInput, TimeWindow, MAX_SLOTS_PER_BATCH};
use crate::repositories::SlotRepository;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Publishes and retracts bookable slots
pub struct SlotCatalog {
    slot_repo: Arc<SlotRepository>,
}

impl SlotCatalog {
    pub fn new(slot_repo: Arc<SlotRepository>) -> Self {
        Self { slot_repo }
    }

    /// Publish up to ten slots on an arena the caller owns.
    ///
    /// Input is validated in full before the store is touched; the batch is
    /// then inserted atomically or not at all.
    pub async fn publish_slots(
        &self,
        caller: &Caller,
        arena_id: i64,
        slots: &[SlotInput],
    ) -> AppResult<Vec<Slot>> {
        caller.require(Role::Owner, "publish slots")?;
        let windows = validate_batch(slots)?;

        info!(
            "Publishing {} slot(s): arena={}, owner={}",
            windows.len(),
            arena_id,
            caller.account_id
        );

        let created = self
            .slot_repo
            .publish(arena_id, caller.account_id, &windows)
            .await
            .map_err(|e| {
                warn!("Publish rejected for arena {}: {}", arena_id, e);
                AppError::from(e)
            })?;

        info!("Published {} slot(s) on arena {}", created.len(), arena_id);
        Ok(created)
    }

    /// Retract an unreserved slot. A second retraction reports NotFound.
    pub async fn retract_slot(&self, caller: &Caller, slot_id: Uuid) -> AppResult<Slot> {
        caller.require(Role::Owner, "retract slots")?;

        let slot = self
            .slot_repo
            .retract(slot_id, caller.account_id)
            .await
            .map_err(|e| {
                warn!("Retract rejected for slot {}: {}", slot_id, e);
                AppError::from(e)
            })?;

        info!("Slot {} retracted by owner {}", slot_id, caller.account_id);
        Ok(slot)
    }

    /// All published slots of an arena in calendar order
    pub async fn list_arena_slots(&self, arena_id: i64) -> AppResult<Vec<Slot>> {
        Ok(self.slot_repo.find_by_arena(arena_id).await?)
    }

    /// Slots still open for requests
    pub async fn list_open_slots(
        &self,
        arena_id: Option<i64>,
        range: DateRange,
        page: PageRequest,
    ) -> AppResult<Page<Slot>> {
        Ok(self.slot_repo.find_open(arena_id, range, page).await?)
    }

    /// The calling owner's published slots
    pub async fn list_owner_slots(
        &self,
        caller: &Caller,
        reserved: Option<bool>,
        range: DateRange,
        page: PageRequest,
    ) -> AppResult<Page<Slot>> {
        caller.require(Role::Owner, "list published slots")?;
        Ok(self
            .slot_repo
            .find_by_owner(caller.account_id, reserved, range, page)
            .await?)
    }
}

/// Check batch size and parse every slot, failing on the first bad one
pub fn validate_batch(slots: &[SlotInput]) -> AppResult<Vec<TimeWindow>> {
    if slots.is_empty() {
        return Err(AppError::Validation(
            "at least one availability slot is required".to_string(),
        ));
    }
    if slots.len() > MAX_SLOTS_PER_BATCH {
        return Err(AppError::Validation(format!(
            "maximum {} availability records allowed per request",
            MAX_SLOTS_PER_BATCH
        )));
    }

    slots
        .iter()
        .map(|s| s.parse().map_err(AppError::Validation))
        .collect()
}
