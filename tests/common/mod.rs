//! Shared test fixtures and helpers

pub mod database;

use sqlx::SqlitePool;
use xfchat::db::users;
use xfchat::models::User;

/// Create a user whose names derive from `name`, so assertions can
/// recognize it later.
pub async fn create_test_user(pool: &SqlitePool, name: &str) -> User {
    users::create_user(pool, &format!("{name}@example.com"), name, "Tester", name)
        .await
        .expect("failed to create test user")
}
