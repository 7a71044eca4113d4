//! Core Configuration
//!
//! Explicit configuration for the storage layer. Nothing here is looked up
//! globally at call time: construct a [`CoreConfig`] (directly or via
//! [`CoreConfig::from_env`]) and pass the resulting pool into the
//! operations in [`crate::db`].

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::ChatResult;

/// Storage configuration for the chat core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// SQLite connection URL, e.g. `sqlite://xfchat.db`
    pub database_url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl CoreConfig {
    /// Create a configuration for the given database URL with default
    /// pool sizing.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `DATABASE_URL` (after loading a `.env` file if present).
    /// Returns `None` when the variable is not set, so a host can decide
    /// whether running without persistence is acceptable.
    pub fn from_env() -> Option<Self> {
        dotenv::dotenv().ok();
        match std::env::var("DATABASE_URL") {
            Ok(url) => Some(Self::new(url)),
            Err(_) => {
                tracing::warn!("DATABASE_URL not set, chat core has no database");
                None
            }
        }
    }

    /// Connect to the database and run schema migrations.
    ///
    /// The pool is configured with WAL journaling (readers never block
    /// writers), foreign keys on, and a busy timeout so short write
    /// contention waits instead of failing.
    pub async fn connect(&self) -> ChatResult<SqlitePool> {
        tracing::info!("connecting to chat database");

        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await?;

        crate::db::run_migrations(&pool).await?;
        tracing::info!("chat database ready");

        Ok(pool)
    }
}
