//! Database operations for users
//!
//! Users mirror the external identity provider; the core only ever writes
//! the mirror row and reads names for address-book entries.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::ChatResult;
use crate::models::User;

/// Create a user mirror row
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    first_name: &str,
    last_name: &str,
    user_name: &str,
) -> ChatResult<User> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, first_name, last_name, user_name, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(user_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id,
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        user_name: user_name.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, user_id: Uuid) -> ChatResult<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, first_name, last_name, user_name, created_at, updated_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| User {
        id: r.get("id"),
        email: r.get("email"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        user_name: r.get("user_name"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }))
}
