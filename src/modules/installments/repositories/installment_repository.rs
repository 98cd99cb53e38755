// SQLite CRUD for installments.
//
// Amount columns are TEXT (sqlx has no SQLite Decimal mapping), so reads go
// through InstallmentRow and a TryFrom conversion.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use crate::core::money;
use crate::core::{AppError, Result};
use crate::modules::installments::models::{Installment, ScheduledPayment};

/// Repository for installment database operations
pub struct InstallmentRepository {
    pool: SqlitePool,
}

impl InstallmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a freshly computed schedule for a loan within a transaction.
    ///
    /// The caller owns the transaction so the loan row and its schedule
    /// commit or roll back together.
    pub async fn create_schedule_with_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        loan_id: i64,
        schedule: &[ScheduledPayment],
    ) -> Result<()> {
        for payment in schedule {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    loan_id, sequence_number, due_date, amount_total,
                    amount_principal, amount_interest, remaining_balance,
                    is_paid, paid_at, paid_amount
                ) VALUES (?, ?, ?, ?, ?, ?, ?, FALSE, NULL, NULL)
                "#,
            )
            .bind(loan_id)
            .bind(payment.sequence_number)
            .bind(payment.due_date)
            .bind(payment.amount_total.to_string())
            .bind(payment.amount_principal.to_string())
            .bind(payment.amount_interest.to_string())
            .bind(payment.remaining_balance.to_string())
            .execute(tx.as_mut())
            .await?;
        }

        Ok(())
    }

    /// All installments of a loan, ordered by sequence number
    pub async fn find_by_loan(&self, loan_id: i64) -> Result<Vec<Installment>> {
        let rows = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT id, loan_id, sequence_number, due_date, amount_total,
                   amount_principal, amount_interest, remaining_balance,
                   is_paid, paid_at, paid_amount
            FROM installments
            WHERE loan_id = ?
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Installment> {
        let row = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT id, loan_id, sequence_number, due_date, amount_total,
                   amount_principal, amount_interest, remaining_balance,
                   is_paid, paid_at, paid_amount
            FROM installments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::not_found(format!("installment {}", id)))?
            .try_into()
    }

    /// Persist the paid state of an installment after the model mutated it
    pub async fn update_paid_state(&self, installment: &Installment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET is_paid = ?, paid_amount = ?, paid_at = ?
            WHERE id = ?
            "#,
        )
        .bind(installment.is_paid)
        .bind(installment.paid_amount.map(|a| a.to_string()))
        .bind(installment.paid_at)
        .bind(installment.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "installment {}",
                installment.id
            )));
        }

        Ok(())
    }
}

/// Raw database row before Decimal conversion
#[derive(Debug, FromRow)]
struct InstallmentRow {
    id: i64,
    loan_id: i64,
    sequence_number: i32,
    due_date: NaiveDate,
    amount_total: String,
    amount_principal: String,
    amount_interest: String,
    remaining_balance: String,
    is_paid: bool,
    paid_at: Option<NaiveDateTime>,
    paid_amount: Option<String>,
}

impl TryFrom<InstallmentRow> for Installment {
    type Error = AppError;

    fn try_from(row: InstallmentRow) -> Result<Installment> {
        let paid_amount = row
            .paid_amount
            .as_deref()
            .map(money::parse_amount)
            .transpose()
            .map_err(AppError::internal)?;

        Ok(Installment {
            id: row.id,
            loan_id: row.loan_id,
            sequence_number: row.sequence_number,
            due_date: row.due_date,
            amount_total: money::parse_amount(&row.amount_total).map_err(AppError::internal)?,
            amount_principal: money::parse_amount(&row.amount_principal)
                .map_err(AppError::internal)?,
            amount_interest: money::parse_amount(&row.amount_interest)
                .map_err(AppError::internal)?,
            remaining_balance: money::parse_amount(&row.remaining_balance)
                .map_err(AppError::internal)?,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            paid_amount,
        })
    }
}
