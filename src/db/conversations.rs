//! Database operations for conversations and membership
//!
//! Membership is the authorization relation for the whole messaging core:
//! `is_member` is the guard the message and receipt operations evaluate
//! inside their own transactions.

use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};
use crate::models::{Conversation, Member, MemberRole};

/// Create a conversation; the creator becomes its first member with the
/// `owner` role. The conversation and the member row commit together.
///
/// Fails with `InvalidArgument` when the title is empty or
/// whitespace-only.
pub async fn create_conversation(
    pool: &SqlitePool,
    creator_id: Uuid,
    title: &str,
) -> ChatResult<Conversation> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ChatError::invalid_argument(
            "title",
            "title cannot be empty",
        ));
    }

    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO conversations (id, creator_id, title, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(id)
    .bind(creator_id)
    .bind(title)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO members (conversation_id, user_id, role, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(id)
    .bind(creator_id)
    .bind(MemberRole::Owner.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(conversation_id = %id, creator_id = %creator_id, "conversation created");

    Ok(Conversation {
        id,
        creator_id,
        title: title.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a conversation by ID
pub async fn get_conversation(
    pool: &SqlitePool,
    conversation_id: Uuid,
) -> ChatResult<Option<Conversation>> {
    let row = sqlx::query(
        r#"
        SELECT id, creator_id, title, created_at, updated_at
        FROM conversations
        WHERE id = ?1
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| Conversation {
        id: r.get("id"),
        creator_id: r.get("creator_id"),
        title: r.get("title"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }))
}

/// Get conversations a user belongs to, most recently active first
pub async fn conversations_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
) -> ChatResult<Vec<Conversation>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.creator_id, c.title, c.created_at, c.updated_at
        FROM conversations c
        INNER JOIN members m ON c.id = m.conversation_id
        WHERE m.user_id = ?1
        ORDER BY c.updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Conversation {
            id: r.get("id"),
            creator_id: r.get("creator_id"),
            title: r.get("title"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
        .collect())
}

/// Add a member to a conversation.
///
/// Idempotent: re-adding an existing member succeeds without duplication
/// and keeps the original role. Fails with `NotFound` when the
/// conversation is unknown.
pub async fn add_member(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ChatResult<()> {
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    ensure_conversation_exists(&mut *tx, conversation_id).await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO members (conversation_id, user_id, role, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(MemberRole::Member.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a member from a conversation.
///
/// Fails with `NotFound` when the membership does not exist. Messages the
/// user sent earlier stay in place.
pub async fn remove_member(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ChatResult<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM members
        WHERE conversation_id = ?1 AND user_id = ?2
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ChatError::not_found(
            "membership",
            format!("{}/{}", conversation_id, user_id),
        ));
    }

    tracing::info!(conversation_id = %conversation_id, user_id = %user_id, "member removed");
    Ok(())
}

/// Check if a user is a member of a conversation
pub async fn is_member(
    pool: &SqlitePool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ChatResult<bool> {
    let row = sqlx::query(
        r#"
        SELECT 1 FROM members
        WHERE conversation_id = ?1 AND user_id = ?2
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Get the members of a conversation, in join order
pub async fn members_of(pool: &SqlitePool, conversation_id: Uuid) -> ChatResult<Vec<Member>> {
    let rows = sqlx::query(
        r#"
        SELECT conversation_id, user_id, role, created_at, updated_at
        FROM members
        WHERE conversation_id = ?1
        ORDER BY created_at ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let role: String = r.get("role");
            Ok(Member {
                conversation_id: r.get("conversation_id"),
                user_id: r.get("user_id"),
                role: MemberRole::from_str(&role).ok_or_else(|| {
                    ChatError::invalid_argument("role", format!("unrecognized role '{}'", role))
                })?,
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
        })
        .collect()
}

/// Delete a conversation and everything hanging off it.
///
/// The cascade runs as explicit ordered deletes in one transaction:
/// read receipts, then messages, then members, then the conversation
/// itself.
pub async fn delete_conversation(pool: &SqlitePool, conversation_id: Uuid) -> ChatResult<()> {
    let mut tx = pool.begin().await?;

    ensure_conversation_exists(&mut *tx, conversation_id).await?;

    sqlx::query("DELETE FROM read_receipts WHERE conversation_id = ?1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM messages WHERE conversation_id = ?1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM members WHERE conversation_id = ?1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM conversations WHERE id = ?1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(conversation_id = %conversation_id, "conversation deleted");
    Ok(())
}

/// Membership check against an open transaction, shared with the message
/// and receipt operations so the guard and the dependent write commit
/// atomically.
pub(crate) async fn is_member_tx(
    conn: &mut SqliteConnection,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ChatResult<bool> {
    let row = sqlx::query(
        r#"
        SELECT 1 FROM members
        WHERE conversation_id = ?1 AND user_id = ?2
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.is_some())
}

pub(crate) async fn ensure_conversation_exists(
    conn: &mut SqliteConnection,
    conversation_id: Uuid,
) -> ChatResult<()> {
    let row = sqlx::query("SELECT 1 FROM conversations WHERE id = ?1")
        .bind(conversation_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(_) => Ok(()),
        None => Err(ChatError::not_found("conversation", conversation_id)),
    }
}
