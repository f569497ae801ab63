use crate::auth::{Caller, Role};
use crate::error::{AppError, AppResult};
use crate::models::{BookingRequest, BookingRequestDetails, BookingStatus, Decision, Page, PageRequest};
use crate::repositories::{BookingRequestRepository, Party, Resolution};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives booking requests from Pending to Booked or Declined
pub struct ReservationWorkflow {
    request_repo: Arc<BookingRequestRepository>,
}

impl ReservationWorkflow {
    pub fn new(request_repo: Arc<BookingRequestRepository>) -> Self {
        Self { request_repo }
    }

    /// Ask for an open slot. The arena price is frozen onto the request.
    pub async fn request_slot(&self, caller: &Caller, slot_id: Uuid) -> AppResult<BookingRequest> {
        caller.require(Role::User, "request slots")?;

        let request = self
            .request_repo
            .create(caller.account_id, slot_id)
            .await
            .map_err(|e| {
                warn!("Request for slot {} by {} rejected: {}", slot_id, caller.account_id, e);
                AppError::from(e)
            })?;

        info!(
            "Booking request {} created: slot={}, requester={}, price={}",
            request.id, slot_id, caller.account_id, request.price
        );
        Ok(request)
    }

    /// Accept or decline a pending request.
    ///
    /// Accepting reserves the slot and raises the payment obligation in the
    /// same transaction. Other pending requests for the slot are left as they
    /// are and can no longer be resolved.
    pub async fn resolve(
        &self,
        caller: &Caller,
        request_id: i64,
        decision: Decision,
    ) -> AppResult<Resolution> {
        caller.require(Role::Owner, "resolve booking requests")?;

        let resolution = self
            .request_repo
            .resolve(request_id, caller.account_id, decision)
            .await
            .map_err(|e| {
                warn!("Resolving request {} as {:?} failed: {}", request_id, decision, e);
                AppError::from(e)
            })?;

        match &resolution.payment {
            Some(payment) => info!(
                "Request {} booked: slot {} reserved for {}, payment {} raised",
                request_id, resolution.slot.id, resolution.request.requester_id, payment.id
            ),
            None => info!("Request {} declined", request_id),
        }

        Ok(resolution)
    }

    /// Requester hides the request from their own listings
    pub async fn withdraw(&self, caller: &Caller, request_id: i64) -> AppResult<BookingRequest> {
        caller.require(Role::User, "withdraw booking requests")?;
        self.hide_for(caller, request_id, Party::Requester).await
    }

    /// Owner hides the request from their own listings
    pub async fn hide(&self, caller: &Caller, request_id: i64) -> AppResult<BookingRequest> {
        caller.require(Role::Owner, "hide booking requests")?;
        self.hide_for(caller, request_id, Party::Owner).await
    }

    async fn hide_for(
        &self,
        caller: &Caller,
        request_id: i64,
        party: Party,
    ) -> AppResult<BookingRequest> {
        let request = self
            .request_repo
            .hide_for(request_id, caller.account_id, party)
            .await?;

        info!("Request {} hidden for {:?} {}", request_id, party, caller.account_id);
        Ok(request)
    }

    pub async fn list_requester_requests(
        &self,
        caller: &Caller,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> AppResult<Page<BookingRequestDetails>> {
        Ok(self
            .request_repo
            .find_for_requester(caller.account_id, status, page)
            .await?)
    }

    pub async fn list_owner_requests(
        &self,
        caller: &Caller,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> AppResult<Page<BookingRequestDetails>> {
        caller.require(Role::Owner, "list incoming booking requests")?;
        Ok(self
            .request_repo
            .find_for_owner(caller.account_id, status, page)
            .await?)
    }
}
