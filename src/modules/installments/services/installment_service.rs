use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

use crate::core::Result;
use crate::modules::installments::models::Installment;
use crate::modules::installments::repositories::InstallmentRepository;

/// Booking side of installments: marking paid and unpaid.
///
/// The scheduling engine never mutates paid state; this service is the only
/// writer.
pub struct InstallmentService {
    repository: InstallmentRepository,
}

impl InstallmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repository: InstallmentRepository::new(pool),
        }
    }

    /// Book a payment. Without an explicit amount the scheduled total is
    /// assumed, which is what the chat "mark paid" button does.
    pub async fn pay(&self, installment_id: i64, amount: Option<Decimal>) -> Result<Installment> {
        let mut installment = self.repository.find_by_id(installment_id).await?;
        let paid_amount = amount.unwrap_or(installment.amount_total);

        installment.mark_paid(paid_amount, Utc::now().naive_utc())?;
        self.repository.update_paid_state(&installment).await?;

        info!(
            installment_id,
            loan_id = installment.loan_id,
            sequence = installment.sequence_number,
            %paid_amount,
            "Installment marked paid"
        );

        Ok(installment)
    }

    /// Revert a mistaken booking
    pub async fn unpay(&self, installment_id: i64) -> Result<Installment> {
        let mut installment = self.repository.find_by_id(installment_id).await?;
        installment.mark_unpaid();
        self.repository.update_paid_state(&installment).await?;

        info!(installment_id, "Installment marked unpaid");
        Ok(installment)
    }
}
