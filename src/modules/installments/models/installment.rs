use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// One line of a computed amortization schedule.
///
/// Pure engine output: no identity, no paid state. For every line
/// `amount_principal + amount_interest == amount_total` to rounding
/// precision, `remaining_balance` never increases across the schedule and
/// is exactly zero on the last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    /// 1-based position within the schedule
    pub sequence_number: i32,
    pub due_date: NaiveDate,
    pub amount_total: Decimal,
    pub amount_principal: Decimal,
    pub amount_interest: Decimal,
    pub remaining_balance: Decimal,
}

/// A persisted installment owned by a loan.
///
/// The paid fields are mutated only through the repository (the booking
/// side); the scheduling engine never touches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    pub loan_id: i64,
    pub sequence_number: i32,
    pub due_date: NaiveDate,
    pub amount_total: Decimal,
    pub amount_principal: Decimal,
    pub amount_interest: Decimal,
    pub remaining_balance: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<NaiveDateTime>,
    pub paid_amount: Option<Decimal>,
}

impl Installment {
    /// Mark this installment paid
    pub fn mark_paid(&mut self, paid_amount: Decimal, paid_at: NaiveDateTime) -> Result<()> {
        if self.is_paid {
            return Err(AppError::validation(format!(
                "Installment {} is already paid",
                self.sequence_number
            )));
        }

        self.is_paid = true;
        self.paid_amount = Some(paid_amount);
        self.paid_at = Some(paid_at);

        Ok(())
    }

    /// Revert a mistaken payment booking
    pub fn mark_unpaid(&mut self) {
        self.is_paid = false;
        self.paid_amount = None;
        self.paid_at = None;
    }
}
