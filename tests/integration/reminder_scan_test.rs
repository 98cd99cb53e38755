// Reminder scan: only unpaid installments whose due date is exactly the
// loan's reminder lead after "today" are picked up and dispatched.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use vamyar::core::Result;
use vamyar::installments::InstallmentService;
use vamyar::loans::{LoanService, LoanTerms, NewLoan};
use vamyar::reminders::{Notifier, ReminderService};
use vamyar::users::{NewUser, UserRepository};

async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Notifier that records every message it is asked to deliver
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

async fn seed_loan(
    pool: &SqlitePool,
    chat_id: i64,
    first_payment_date: NaiveDate,
    reminder_days_before: i32,
) -> i64 {
    let user = UserRepository::new(pool.clone())
        .find_or_create(&NewUser::new(chat_id, "Reminder User"))
        .await
        .unwrap();

    LoanService::new(pool.clone())
        .create_loan(NewLoan {
            user_id: user.id,
            bank: "Melli".to_string(),
            loan_name: "Home loan".to_string(),
            terms: LoanTerms {
                principal: dec!(90_000),
                annual_rate_percent: dec!(15),
                term_months: 3,
                first_payment_date,
            },
            reminder_days_before,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_scan_picks_installments_at_exact_lead() {
    let pool = memory_pool().await;
    let due = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    seed_loan(&pool, 100, due, 2).await;

    let service = ReminderService::new(pool.clone());

    // Two days before the due date: exactly one notice
    let notices = service.due_reminders(due - chrono::Days::new(2)).await.unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].chat_id, 100);
    assert_eq!(notices[0].sequence_number, 1);
    assert_eq!(notices[0].due_date, due);

    // One day before (wrong lead for this loan) or on the day itself: nothing
    assert!(service
        .due_reminders(due - chrono::Days::new(1))
        .await
        .unwrap()
        .is_empty());
    assert!(service.due_reminders(due).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_paid_installments_are_not_reminded() {
    let pool = memory_pool().await;
    let due = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let loan_id = seed_loan(&pool, 200, due, 1).await;

    let schedule = LoanService::new(pool.clone())
        .schedule_of(loan_id)
        .await
        .unwrap();
    InstallmentService::new(pool.clone())
        .pay(schedule[0].id, None)
        .await
        .unwrap();

    let service = ReminderService::new(pool.clone());
    let notices = service.due_reminders(due - chrono::Days::new(1)).await.unwrap();
    assert!(notices.is_empty());
}

#[tokio::test]
async fn test_run_once_dispatches_formatted_messages() {
    let pool = memory_pool().await;
    let due = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    seed_loan(&pool, 300, due, 1).await;

    let service = ReminderService::new(pool.clone());
    let notifier = RecordingNotifier::default();

    let sent = service
        .run_once(due - chrono::Days::new(1), &notifier)
        .await
        .unwrap();
    assert_eq!(sent, 1);

    let messages = notifier.sent.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, 300);
    // Due date is rendered in the Jalali calendar (2024-03-20 is 1403-01-01)
    assert!(messages[0].1.contains("1403-01-01"), "{}", messages[0].1);
    assert!(messages[0].1.contains("Home loan"));
}
