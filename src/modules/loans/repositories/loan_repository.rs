use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::core::money;
use crate::core::{AppError, Result};
use crate::modules::loans::models::{Loan, LoanStatus, NewLoan, PaymentCycle};

/// Repository for loan database operations
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction covering the loan row and its schedule
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a loan within a transaction, returning its generated id
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        new_loan: &NewLoan,
    ) -> Result<i64> {
        let now = Utc::now().naive_utc();

        let id = sqlx::query(
            r#"
            INSERT INTO loans (
                user_id, bank, loan_name, principal, annual_interest_rate,
                term_months, payment_cycle, first_payment_date,
                reminder_days_before, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?)
            "#,
        )
        .bind(new_loan.user_id)
        .bind(&new_loan.bank)
        .bind(&new_loan.loan_name)
        .bind(new_loan.terms.principal.to_string())
        .bind(new_loan.terms.annual_rate_percent.to_string())
        .bind(new_loan.terms.term_months)
        .bind(PaymentCycle::Monthly.as_str())
        .bind(new_loan.terms.first_payment_date)
        .bind(new_loan.reminder_days_before)
        .bind(now)
        .bind(now)
        .execute(tx.as_mut())
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Loan> {
        let row = sqlx::query_as::<_, LoanRow>(&select_loans("WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| AppError::not_found(format!("loan {}", id)))?
            .try_into()
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Vec<Loan>> {
        let rows = sqlx::query_as::<_, LoanRow>(&select_loans("WHERE user_id = ? ORDER BY id ASC"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete a loan; installments go with it via the FK cascade
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM loans WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("loan {}", id)));
        }

        Ok(())
    }
}

fn select_loans(suffix: &str) -> String {
    format!(
        r#"
        SELECT id, user_id, bank, loan_name, principal, annual_interest_rate,
               term_months, payment_cycle, first_payment_date,
               reminder_days_before, status, created_at, updated_at
        FROM loans
        {}
        "#,
        suffix
    )
}

/// Raw database row before Decimal/enum conversion
#[derive(Debug, FromRow)]
struct LoanRow {
    id: i64,
    user_id: i64,
    bank: String,
    loan_name: String,
    principal: String,
    annual_interest_rate: String,
    term_months: i32,
    payment_cycle: String,
    first_payment_date: NaiveDate,
    reminder_days_before: i32,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<LoanRow> for Loan {
    type Error = AppError;

    fn try_from(row: LoanRow) -> Result<Loan> {
        Ok(Loan {
            id: row.id,
            user_id: row.user_id,
            bank: row.bank,
            loan_name: row.loan_name,
            principal: money::parse_amount(&row.principal).map_err(AppError::internal)?,
            annual_interest_rate: money::parse_amount(&row.annual_interest_rate)
                .map_err(AppError::internal)?,
            term_months: row.term_months,
            payment_cycle: PaymentCycle::try_from(row.payment_cycle).map_err(AppError::internal)?,
            first_payment_date: row.first_payment_date,
            reminder_days_before: row.reminder_days_before,
            status: LoanStatus::try_from(row.status).map_err(AppError::internal)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
