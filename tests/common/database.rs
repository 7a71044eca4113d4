//! Database test fixtures
//!
//! Each test gets its own throwaway SQLite file with migrations applied,
//! so suites stay isolated and need no external services.

use sqlx::SqlitePool;
use tempfile::TempDir;
use xfchat::CoreConfig;

/// Test database over a throwaway SQLite file.
pub struct TestDatabase {
    pool: SqlitePool,
    // keeps the backing file alive for the pool's lifetime
    _dir: TempDir,
}

impl TestDatabase {
    /// Create a fresh database with the schema applied.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("xfchat_test.db");

        let config = CoreConfig {
            database_url: format!("sqlite://{}", path.display()),
            // a single connection makes concurrent test tasks interleave
            // at the pool instead of tripping SQLITE_BUSY mid-transaction
            max_connections: 1,
        };

        let pool = config
            .connect()
            .await
            .expect("failed to connect test database");

        Self { pool, _dir: dir }
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
