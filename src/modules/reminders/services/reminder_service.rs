use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::core::{money, AppError, JalaliDate, Result};
use crate::modules::reminders::services::Notifier;

/// One upcoming unpaid installment that has reached its loan's reminder lead
#[derive(Debug, Clone)]
pub struct ReminderNotice {
    pub chat_id: i64,
    pub loan_name: String,
    pub bank: String,
    pub sequence_number: i32,
    pub due_date: NaiveDate,
    pub amount_total: Decimal,
    pub days_before: i32,
}

impl ReminderNotice {
    /// Message text handed to the notifier; the due date is rendered in the
    /// Jalali calendar since that is what the user entered and expects
    pub fn message(&self) -> String {
        let due = match JalaliDate::from_gregorian(self.due_date) {
            Ok(jalali) => jalali.to_string(),
            Err(_) => self.due_date.to_string(),
        };

        format!(
            "Payment reminder: installment {} of \"{}\" ({}) is due on {}, amount {}",
            self.sequence_number,
            self.loan_name,
            self.bank,
            due,
            money::format_amount(self.amount_total),
        )
    }
}

/// Daily scan over unpaid installments, dispatching reminders through a
/// [`Notifier`]
pub struct ReminderService {
    pool: SqlitePool,
}

impl ReminderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Unpaid installments whose due date is exactly the loan's configured
    /// lead (`reminder_days_before`) after `today`
    pub async fn due_reminders(&self, today: NaiveDate) -> Result<Vec<ReminderNotice>> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            r#"
            SELECT u.chat_id, l.loan_name, l.bank, i.sequence_number,
                   i.due_date, i.amount_total, l.reminder_days_before
            FROM installments i
            JOIN loans l ON l.id = i.loan_id
            JOIN users u ON u.id = l.user_id
            WHERE i.is_paid = FALSE
              AND DATE(i.due_date) = DATE(?, '+' || l.reminder_days_before || ' days')
            ORDER BY u.chat_id ASC, i.due_date ASC, i.sequence_number ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// One scan-and-dispatch pass. Delivery failures are logged and skipped
    /// so one unreachable chat cannot block the rest; returns the number of
    /// reminders actually sent.
    pub async fn run_once(&self, today: NaiveDate, notifier: &dyn Notifier) -> Result<usize> {
        let notices = self.due_reminders(today).await?;
        let mut sent = 0;

        for notice in &notices {
            match notifier.send(notice.chat_id, &notice.message()).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(
                    chat_id = notice.chat_id,
                    error = %e,
                    "Failed to send reminder"
                ),
            }
        }

        info!(scanned = notices.len(), sent, %today, "Reminder scan finished");
        Ok(sent)
    }
}

#[derive(Debug, FromRow)]
struct ReminderRow {
    chat_id: i64,
    loan_name: String,
    bank: String,
    sequence_number: i32,
    due_date: NaiveDate,
    amount_total: String,
    reminder_days_before: i32,
}

impl TryFrom<ReminderRow> for ReminderNotice {
    type Error = AppError;

    fn try_from(row: ReminderRow) -> Result<ReminderNotice> {
        Ok(ReminderNotice {
            chat_id: row.chat_id,
            loan_name: row.loan_name,
            bank: row.bank,
            sequence_number: row.sequence_number,
            due_date: row.due_date,
            amount_total: money::parse_amount(&row.amount_total).map_err(AppError::internal)?,
            days_before: row.reminder_days_before,
        })
    }
}
