use crate::auth::{Caller, Role};
use crate::error::{AppError, AppResult};
use crate::models::{PageRequest, PaymentDetails, PaymentObligation, PaymentPage};
use crate::repositories::PaymentRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Settles the obligations raised by accepted bookings
pub struct PaymentLedger {
    payment_repo: Arc<PaymentRepository>,
}

impl PaymentLedger {
    pub fn new(payment_repo: Arc<PaymentRepository>) -> Self {
        Self { payment_repo }
    }

    /// Mark an obligation paid. Only the payer, only once.
    pub async fn settle(&self, caller: &Caller, payment_id: i64) -> AppResult<PaymentObligation> {
        caller.require(Role::User, "settle payments")?;

        let payment = self
            .payment_repo
            .settle(payment_id, caller.account_id)
            .await
            .map_err(|e| {
                warn!("Settling payment {} by {} failed: {}", payment_id, caller.account_id, e);
                AppError::from(e)
            })?;

        info!("Payment {} settled by {}", payment_id, caller.account_id);
        Ok(payment)
    }

    /// What the caller owes, optionally only paid or unpaid obligations
    pub async fn list_payer_payments(
        &self,
        caller: &Caller,
        paid: Option<bool>,
        page: PageRequest,
    ) -> AppResult<PaymentPage<PaymentDetails>> {
        let page = self
            .payment_repo
            .find_for_payer(caller.account_id, paid, page)
            .await?;
        Ok(with_total(page))
    }

    /// What the calling owner is owed
    pub async fn list_owner_payments(
        &self,
        caller: &Caller,
        paid: Option<bool>,
        page: PageRequest,
    ) -> AppResult<PaymentPage<PaymentDetails>> {
        caller.require(Role::Owner, "list received payments")?;
        let page = self
            .payment_repo
            .find_for_owner(caller.account_id, paid, page)
            .await?;
        Ok(with_total(page))
    }
}

fn with_total(page: crate::models::Page<PaymentDetails>) -> PaymentPage<PaymentDetails> {
    let total_amount = page.items.iter().map(|p| p.price).sum::<Decimal>();
    PaymentPage { page, total_amount }
}
