// One-way reconciliation of the main database into a secondary backup
// database. Rows are upserted by their natural keys; loan status is derived
// on the backup side (active/completed), and loans that disappeared from the
// main database are kept but marked deleted.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::core::Result;
use crate::modules::loans::models::LoanStatus;

/// Counters reported after one sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    pub users: usize,
    pub loans: usize,
    pub installments: usize,
    pub marked_deleted: usize,
}

/// Main-to-backup reconciliation job
pub struct BackupService {
    main: SqlitePool,
    backup: SqlitePool,
}

impl BackupService {
    pub fn new(main: SqlitePool, backup: SqlitePool) -> Self {
        Self { main, backup }
    }

    /// Run one full sync pass
    pub async fn run_sync(&self) -> Result<BackupSummary> {
        let mut summary = BackupSummary::default();
        let mut seen_loan_ids = HashSet::new();

        let users = sqlx::query_as::<_, UserRow>(
            "SELECT id, chat_id, name, timezone FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.main)
        .await?;

        for user in &users {
            let backup_user_id = self.sync_user(user).await?;
            summary.users += 1;

            let loans = sqlx::query_as::<_, LoanRow>(
                r#"
                SELECT id, bank, loan_name, principal, annual_interest_rate,
                       term_months, payment_cycle, first_payment_date,
                       reminder_days_before, created_at, updated_at
                FROM loans
                WHERE user_id = ?
                ORDER BY id ASC
                "#,
            )
            .bind(user.id)
            .fetch_all(&self.main)
            .await?;

            for loan in &loans {
                seen_loan_ids.insert(loan.id);
                summary.installments += self.sync_loan(loan, backup_user_id).await?;
                summary.loans += 1;
            }
        }

        summary.marked_deleted = self.mark_deleted_loans(&seen_loan_ids).await?;

        info!(
            users = summary.users,
            loans = summary.loans,
            installments = summary.installments,
            marked_deleted = summary.marked_deleted,
            "Backup sync finished"
        );

        Ok(summary)
    }

    /// Upsert a user by chat id, returning the backup-side user id
    async fn sync_user(&self, user: &UserRow) -> Result<i64> {
        sqlx::query(
            r#"
            INSERT INTO users (chat_id, name, timezone)
            VALUES (?, ?, ?)
            ON CONFLICT (chat_id) DO UPDATE SET
                name = excluded.name,
                timezone = excluded.timezone
            "#,
        )
        .bind(user.chat_id)
        .bind(&user.name)
        .bind(&user.timezone)
        .execute(&self.backup)
        .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE chat_id = ?")
            .bind(user.chat_id)
            .fetch_one(&self.backup)
            .await?;

        Ok(id)
    }

    /// Upsert one loan and all its installments; returns the installment
    /// count synced
    async fn sync_loan(&self, loan: &LoanRow, backup_user_id: i64) -> Result<usize> {
        let unpaid: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM installments WHERE loan_id = ? AND is_paid = FALSE",
        )
        .bind(loan.id)
        .fetch_one(&self.main)
        .await?;

        let status = if unpaid == 0 {
            LoanStatus::Completed
        } else {
            LoanStatus::Active
        };

        sqlx::query(
            r#"
            INSERT INTO loans (
                id, user_id, bank, loan_name, principal, annual_interest_rate,
                term_months, payment_cycle, first_payment_date,
                reminder_days_before, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                user_id = excluded.user_id,
                bank = excluded.bank,
                loan_name = excluded.loan_name,
                principal = excluded.principal,
                annual_interest_rate = excluded.annual_interest_rate,
                term_months = excluded.term_months,
                payment_cycle = excluded.payment_cycle,
                first_payment_date = excluded.first_payment_date,
                reminder_days_before = excluded.reminder_days_before,
                status = excluded.status,
                updated_at = ?
            "#,
        )
        .bind(loan.id)
        .bind(backup_user_id)
        .bind(&loan.bank)
        .bind(&loan.loan_name)
        .bind(&loan.principal)
        .bind(&loan.annual_interest_rate)
        .bind(loan.term_months)
        .bind(&loan.payment_cycle)
        .bind(loan.first_payment_date)
        .bind(loan.reminder_days_before)
        .bind(status.as_str())
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .bind(Utc::now().naive_utc())
        .execute(&self.backup)
        .await?;

        let installments = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT id, sequence_number, due_date, amount_total,
                   amount_principal, amount_interest, remaining_balance,
                   is_paid, paid_at, paid_amount
            FROM installments
            WHERE loan_id = ?
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(loan.id)
        .fetch_all(&self.main)
        .await?;

        for inst in &installments {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    id, loan_id, sequence_number, due_date, amount_total,
                    amount_principal, amount_interest, remaining_balance,
                    is_paid, paid_at, paid_amount
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (id) DO UPDATE SET
                    sequence_number = excluded.sequence_number,
                    due_date = excluded.due_date,
                    amount_total = excluded.amount_total,
                    amount_principal = excluded.amount_principal,
                    amount_interest = excluded.amount_interest,
                    remaining_balance = excluded.remaining_balance,
                    is_paid = excluded.is_paid,
                    paid_at = excluded.paid_at,
                    paid_amount = excluded.paid_amount
                "#,
            )
            .bind(inst.id)
            .bind(loan.id)
            .bind(inst.sequence_number)
            .bind(inst.due_date)
            .bind(&inst.amount_total)
            .bind(&inst.amount_principal)
            .bind(&inst.amount_interest)
            .bind(&inst.remaining_balance)
            .bind(inst.is_paid)
            .bind(inst.paid_at)
            .bind(&inst.paid_amount)
            .execute(&self.backup)
            .await?;
        }

        Ok(installments.len())
    }

    /// Loans present only in the backup become status = deleted
    async fn mark_deleted_loans(&self, seen_loan_ids: &HashSet<i64>) -> Result<usize> {
        let backup_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM loans")
            .fetch_all(&self.backup)
            .await?;

        let mut marked = 0;
        for id in backup_ids {
            if seen_loan_ids.contains(&id) {
                continue;
            }

            let result = sqlx::query(
                "UPDATE loans SET status = ?, updated_at = ? WHERE id = ? AND status != ?",
            )
            .bind(LoanStatus::Deleted.as_str())
            .bind(Utc::now().naive_utc())
            .bind(id)
            .bind(LoanStatus::Deleted.as_str())
            .execute(&self.backup)
            .await?;
            marked += result.rows_affected() as usize;
        }

        Ok(marked)
    }
}

// Raw rows copied verbatim between databases; amounts stay in their TEXT
// form since no arithmetic happens here.

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    chat_id: i64,
    name: String,
    timezone: String,
}

#[derive(Debug, FromRow)]
struct LoanRow {
    id: i64,
    bank: String,
    loan_name: String,
    principal: String,
    annual_interest_rate: String,
    term_months: i32,
    payment_cycle: String,
    first_payment_date: NaiveDate,
    reminder_days_before: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, FromRow)]
struct InstallmentRow {
    id: i64,
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
