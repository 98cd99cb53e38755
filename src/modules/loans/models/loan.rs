use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;
use crate::core::{AppError, JalaliDate, Result};

/// Financial parameters of one scheduling run.
///
/// Immutable input to the amortization calculator. The calculator itself
/// never validates; [`LoanTerms::validate`] is the caller's gate before
/// scheduling (a non-positive term is still a defined degenerate case that
/// yields an empty schedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Annual rate as a percentage, e.g. 18.5 for 18.5%
    pub annual_rate_percent: Decimal,
    pub term_months: i32,
    /// First due date, already normalized to Gregorian by the calendar bridge
    pub first_payment_date: NaiveDate,
}

impl LoanTerms {
    pub fn validate(&self) -> Result<()> {
        if self.principal < Decimal::ZERO {
            return Err(AppError::validation("Principal cannot be negative"));
        }

        if self.annual_rate_percent < Decimal::ZERO {
            return Err(AppError::validation("Interest rate cannot be negative"));
        }

        if self.term_months < 1 {
            return Err(AppError::validation(format!(
                "Term must be at least 1 month, got {}",
                self.term_months
            )));
        }

        money::validate_amount(self.principal).map_err(AppError::validation)?;

        // The scheduler advances due dates in Jalali space, so the first
        // payment date must be representable there
        JalaliDate::from_gregorian(self.first_payment_date)?;

        Ok(())
    }
}

/// Payment cycle of a loan. Only monthly cycles are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCycle {
    Monthly,
}

impl PaymentCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for PaymentCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentCycle {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Invalid payment cycle: {}", value)),
        }
    }
}

/// Loan lifecycle status, maintained by the backup reconciler only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Has unpaid installments
    Active,
    /// Every installment is paid
    Completed,
    /// Removed from the main database; kept in the backup for audit
    Deleted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(format!("Invalid loan status: {}", value)),
        }
    }
}

/// A persisted loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub bank: String,
    pub loan_name: String,
    pub principal: Decimal,
    pub annual_interest_rate: Decimal,
    pub term_months: i32,
    pub payment_cycle: PaymentCycle,
    /// Stored in Gregorian form; rendered back as Jalali at the boundary
    pub first_payment_date: NaiveDate,
    /// Days ahead of a due date to remind the user (1, 2 or 3)
    pub reminder_days_before: i32,
    pub status: LoanStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Loan {
    /// The calculator input this loan was scheduled from
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate_percent: self.annual_interest_rate,
            term_months: self.term_months,
            first_payment_date: self.first_payment_date,
        }
    }
}

/// Fields supplied by the add-loan conversation
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub user_id: i64,
    pub bank: String,
    pub loan_name: String,
    pub terms: LoanTerms,
    pub reminder_days_before: i32,
}

impl NewLoan {
    pub fn validate(&self) -> Result<()> {
        self.terms.validate()?;

        if self.bank.trim().is_empty() {
            return Err(AppError::validation("Bank name cannot be empty"));
        }

        if !(1..=3).contains(&self.reminder_days_before) {
            return Err(AppError::validation(format!(
                "Reminder lead must be 1-3 days, got {}",
                self.reminder_days_before
            )));
        }

        Ok(())
    }
}
