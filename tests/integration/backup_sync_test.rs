// Backup reconciliation: rows mirror into the secondary database, loan
// status is derived there, and loans deleted from the main database are
// kept but marked deleted.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use vamyar::backup::BackupService;
use vamyar::installments::InstallmentService;
use vamyar::loans::{LoanService, LoanTerms, NewLoan};
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

async fn seed_loan(pool: &SqlitePool, chat_id: i64, term_months: i32) -> i64 {
    let user = UserRepository::new(pool.clone())
        .find_or_create(&NewUser::new(chat_id, "Backup User"))
        .await
        .unwrap();

    LoanService::new(pool.clone())
        .create_loan(NewLoan {
            user_id: user.id,
            bank: "Saderat".to_string(),
            loan_name: "Appliance loan".to_string(),
            terms: LoanTerms {
                principal: dec!(12_000),
                annual_rate_percent: dec!(20),
                term_months,
                first_payment_date: NaiveDate::from_ymd_opt(2024, 5, 5).unwrap(),
            },
            reminder_days_before: 1,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_sync_mirrors_users_loans_and_installments() {
    let main = memory_pool().await;
    let backup = memory_pool().await;
    let loan_id = seed_loan(&main, 10, 4).await;

    let service = BackupService::new(main.clone(), backup.clone());
    let summary = service.run_sync().await.unwrap();

    assert_eq!(summary.users, 1);
    assert_eq!(summary.loans, 1);
    assert_eq!(summary.installments, 4);
    assert_eq!(summary.marked_deleted, 0);

    let status: String = sqlx::query_scalar("SELECT status FROM loans WHERE id = ?")
        .bind(loan_id)
        .fetch_one(&backup)
        .await
        .unwrap();
    assert_eq!(status, "active");

    let mirrored: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM installments WHERE loan_id = ?")
            .bind(loan_id)
            .fetch_one(&backup)
            .await
            .unwrap();
    assert_eq!(mirrored, 4);
}

#[tokio::test]
async fn test_sync_is_idempotent_and_propagates_payments() {
    let main = memory_pool().await;
    let backup = memory_pool().await;
    let loan_id = seed_loan(&main, 20, 2).await;

    let service = BackupService::new(main.clone(), backup.clone());
    service.run_sync().await.unwrap();

    // Pay everything off, then sync twice more
    let schedule = LoanService::new(main.clone())
        .schedule_of(loan_id)
        .await
        .unwrap();
    let booking = InstallmentService::new(main.clone());
    for installment in &schedule {
        booking.pay(installment.id, None).await.unwrap();
    }

    service.run_sync().await.unwrap();
    let summary = service.run_sync().await.unwrap();
    assert_eq!(summary.loans, 1);

    let status: String = sqlx::query_scalar("SELECT status FROM loans WHERE id = ?")
        .bind(loan_id)
        .fetch_one(&backup)
        .await
        .unwrap();
    assert_eq!(status, "completed");

    let paid: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM installments WHERE loan_id = ? AND is_paid = TRUE",
    )
    .bind(loan_id)
    .fetch_one(&backup)
    .await
    .unwrap();
    assert_eq!(paid, 2);
}

#[tokio::test]
async fn test_deleted_loans_are_marked_in_backup() {
    let main = memory_pool().await;
    let backup = memory_pool().await;
    let keep_id = seed_loan(&main, 30, 2).await;
    let drop_id = seed_loan(&main, 31, 2).await;

    let service = BackupService::new(main.clone(), backup.clone());
    service.run_sync().await.unwrap();

    LoanService::new(main.clone()).delete_loan(drop_id).await.unwrap();
    let summary = service.run_sync().await.unwrap();
    assert_eq!(summary.marked_deleted, 1);

    let dropped_status: String = sqlx::query_scalar("SELECT status FROM loans WHERE id = ?")
        .bind(drop_id)
        .fetch_one(&backup)
        .await
        .unwrap();
    assert_eq!(dropped_status, "deleted");

    let kept_status: String = sqlx::query_scalar("SELECT status FROM loans WHERE id = ?")
        .bind(keep_id)
        .fetch_one(&backup)
        .await
        .unwrap();
    assert_eq!(kept_status, "active");

    // Re-running does not double count already-deleted loans
    let summary = service.run_sync().await.unwrap();
    assert_eq!(summary.marked_deleted, 0);
}
