use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vamyar::backup::BackupService;
use vamyar::config::Config;
use vamyar::reminders::{LogNotifier, ReminderService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vamyar=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting Vamyar loan tracker jobs");
    tracing::info!("Environment: {}", config.app.env);

    // Pools (migrations run on connect)
    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to open main database")?;
    let backup_pool = config
        .database
        .create_backup_pool()
        .await
        .context("Failed to open backup database")?;

    tracing::info!(
        "Databases ready (main: {}, backup: {})",
        config.database.url,
        config.database.backup_url
    );

    let startup_delay = Duration::from_secs(config.jobs.startup_delay_secs);

    // Daily reminder scan
    let reminder_handle = {
        let service = ReminderService::new(pool.clone());
        let interval = Duration::from_secs(config.jobs.reminder_interval_hours * 3600);
        tokio::spawn(async move {
            tokio::time::sleep(startup_delay).await;
            let notifier = LogNotifier;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let today = Utc::now().date_naive();
                if let Err(e) = service.run_once(today, &notifier).await {
                    tracing::error!(error = %e, "Reminder scan failed");
                }
            }
        })
    };

    // Periodic backup reconciliation
    let backup_handle = {
        let service = BackupService::new(pool.clone(), backup_pool.clone());
        let interval = Duration::from_secs(config.jobs.backup_interval_hours * 3600);
        tokio::spawn(async move {
            tokio::time::sleep(startup_delay).await;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = service.run_sync().await {
                    tracing::error!(error = %e, "Backup sync failed");
                }
            }
        })
    };

    tracing::info!(
        "Jobs scheduled (reminders every {}h, backup every {}h)",
        config.jobs.reminder_interval_hours,
        config.jobs.backup_interval_hours
    );

    let _ = tokio::try_join!(reminder_handle, backup_handle)
        .context("Background job terminated unexpectedly")?;

    Ok(())
}
