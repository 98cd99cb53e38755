use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;

pub use database::DatabaseConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jobs: JobConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Cadence of the background reminder and backup jobs
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub reminder_interval_hours: u64,
    pub backup_interval_hours: u64,
    /// Delay before the first run, so startup (migrations, pools) settles
    pub startup_delay_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            jobs: JobConfig {
                reminder_interval_hours: env::var("REMINDER_INTERVAL_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid REMINDER_INTERVAL_HOURS".to_string())
                    })?,
                backup_interval_hours: env::var("BACKUP_INTERVAL_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid BACKUP_INTERVAL_HOURS".to_string())
                    })?,
                startup_delay_secs: env::var("JOB_STARTUP_DELAY_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid JOB_STARTUP_DELAY_SECS".to_string())
                    })?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.jobs.reminder_interval_hours == 0 {
            return Err(AppError::Configuration(
                "Reminder interval must be greater than 0".to_string(),
            ));
        }

        if self.jobs.backup_interval_hours == 0 {
            return Err(AppError::Configuration(
                "Backup interval must be greater than 0".to_string(),
            ));
        }

        if self.database.url == self.database.backup_url {
            return Err(AppError::Configuration(
                "Main and backup databases must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}
