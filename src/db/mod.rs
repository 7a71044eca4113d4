//! Database Operations
//!
//! Free async functions over a [`sqlx::SqlitePool`], one submodule per
//! area. Operations that pair a validation with a dependent write (send a
//! message, mark a message seen, respond to a friend request) run both
//! inside a single transaction, so a check that passed can never be
//! invalidated by a concurrent writer between check and commit. Partial
//! writes are never visible: failure aborts the whole transaction.

use sqlx::SqlitePool;

use crate::error::ChatResult;

pub mod conversations;
pub mod messages;
pub mod notifications;
pub mod receipts;
pub mod social;
pub mod users;

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> ChatResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
