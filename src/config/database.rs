use crate::core::{AppError, Result};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Main database, e.g. `sqlite://loans.db`
    pub url: String,
    /// Secondary database the backup job reconciles into
    pub backup_url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://loans.db".to_string()),
            backup_url: env::var("BACKUP_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://backup.db".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| {
                    AppError::Configuration("Invalid DATABASE_MAX_CONNECTIONS".to_string())
                })?,
        })
    }

    /// Create the main connection pool and apply migrations
    pub async fn create_pool(&self) -> Result<SqlitePool> {
        Self::connect(&self.url, self.max_connections).await
    }

    /// Create the backup connection pool and apply migrations
    pub async fn create_backup_pool(&self) -> Result<SqlitePool> {
        Self::connect(&self.backup_url, self.max_connections).await
    }

    async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(AppError::Database)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(AppError::Database)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;

        Ok(pool)
    }
}
