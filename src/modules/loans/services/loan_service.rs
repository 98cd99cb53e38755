use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

use crate::core::Result;
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::installments::services::AmortizationCalculator;
use crate::modules::installments::models::Installment;
use crate::modules::loans::models::{Loan, NewLoan};
use crate::modules::loans::repositories::LoanRepository;

/// Aggregated view of one loan for the presentation side
#[derive(Debug, Clone)]
pub struct LoanOverview {
    pub loan: Loan,
    pub paid_count: i64,
    pub unpaid_count: i64,
    pub next_due_date: Option<NaiveDate>,
    /// Remaining balance after the last paid installment
    pub outstanding_balance: Decimal,
}

/// Business logic for loan lifecycle operations
pub struct LoanService {
    loans: LoanRepository,
    installments: InstallmentRepository,
    calculator: AmortizationCalculator,
}

impl LoanService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            installments: InstallmentRepository::new(pool),
            calculator: AmortizationCalculator::new(),
        }
    }

    /// Validate the terms, compute the amortization schedule and persist the
    /// loan with its installments in a single transaction
    pub async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan> {
        new_loan.validate()?;

        let schedule = self.calculator.schedule(&new_loan.terms);

        info!(
            user_id = new_loan.user_id,
            bank = new_loan.bank.as_str(),
            term_months = new_loan.terms.term_months,
            installments = schedule.len(),
            "Creating loan with computed schedule"
        );

        let mut tx = self.loans.begin().await?;
        let loan_id = self.loans.create_with_tx(&mut tx, &new_loan).await?;
        self.installments
            .create_schedule_with_tx(&mut tx, loan_id, &schedule)
            .await?;
        tx.commit().await?;

        self.loans.find_by_id(loan_id).await
    }

    pub async fn find_loan(&self, loan_id: i64) -> Result<Loan> {
        self.loans.find_by_id(loan_id).await
    }

    pub async fn loans_for_user(&self, user_id: i64) -> Result<Vec<Loan>> {
        self.loans.find_by_user(user_id).await
    }

    /// The persisted schedule of a loan, in sequence order
    pub async fn schedule_of(&self, loan_id: i64) -> Result<Vec<Installment>> {
        self.installments.find_by_loan(loan_id).await
    }

    /// Paid/unpaid progress and the next due installment, as shown in the
    /// loan detail view
    pub async fn loan_overview(&self, loan_id: i64) -> Result<LoanOverview> {
        let loan = self.loans.find_by_id(loan_id).await?;
        let schedule = self.installments.find_by_loan(loan_id).await?;

        let paid_count = schedule.iter().filter(|i| i.is_paid).count() as i64;
        let unpaid: Vec<_> = schedule.iter().filter(|i| !i.is_paid).collect();
        let next_due_date = unpaid.iter().map(|i| i.due_date).min();

        let outstanding_balance = schedule
            .iter()
            .filter(|i| i.is_paid)
            .max_by_key(|i| i.sequence_number)
            .map(|i| i.remaining_balance)
            .unwrap_or(loan.principal);

        Ok(LoanOverview {
            paid_count,
            unpaid_count: unpaid.len() as i64,
            next_due_date,
            outstanding_balance,
            loan,
        })
    }

    pub async fn delete_loan(&self, loan_id: i64) -> Result<()> {
        info!(loan_id, "Deleting loan");
        self.loans.delete(loan_id).await
    }
}
