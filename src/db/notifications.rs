//! Database operations for notifications
//!
//! Notification rows are the durable fan-out record; delivery transports
//! poll unread rows. Fan-out is exactly-once per (event, recipient)
//! within a call because the recipient set is read and written under the
//! caller's transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::conversations;
use crate::error::{ChatError, ChatResult};
use crate::models::{Notification, NotificationKind};

/// Notify every current member of a conversation except the sender.
///
/// Returns the number of notifications created. Fails with `NotFound`
/// for an unknown conversation.
pub async fn notify_conversation(
    pool: &SqlitePool,
    conversation_id: Uuid,
    sender_id: Uuid,
    kind: NotificationKind,
    content: &str,
) -> ChatResult<u64> {
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    conversations::ensure_conversation_exists(&mut *tx, conversation_id).await?;
    let count = fan_out_to_members(&mut *tx, conversation_id, sender_id, kind, content, now).await?;

    tx.commit().await?;
    Ok(count)
}

/// Notify a single recipient.
pub async fn notify_user(
    pool: &SqlitePool,
    sender_id: Uuid,
    recipient_id: Uuid,
    kind: NotificationKind,
    content: &str,
) -> ChatResult<Notification> {
    let mut conn = pool.acquire().await?;
    insert_notification(&mut *conn, sender_id, recipient_id, kind, content, chrono::Utc::now()).await
}

/// Mark a notification as read.
///
/// Fails with `NotFound` for an unknown id and `PermissionDenied` when
/// the caller is not the notification's recipient. Idempotent when
/// already read; the read flag never flips back.
pub async fn mark_notification_read(
    pool: &SqlitePool,
    notification_id: Uuid,
    recipient_id: Uuid,
) -> ChatResult<()> {
    let row = sqlx::query("SELECT recipient_id FROM notifications WHERE id = ?1")
        .bind(notification_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ChatError::not_found("notification", notification_id))?;

    let owner: Uuid = row.get("recipient_id");
    if owner != recipient_id {
        return Err(ChatError::permission_denied(
            "notification belongs to another recipient",
        ));
    }

    sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = 1, updated_at = ?1
        WHERE id = ?2 AND is_read = 0
        "#,
    )
    .bind(chrono::Utc::now())
    .bind(notification_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get unread notifications for a recipient, newest first
pub async fn unread_notifications(
    pool: &SqlitePool,
    recipient_id: Uuid,
) -> ChatResult<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        SELECT id, sender_id, recipient_id, kind, content, is_read, created_at, updated_at
        FROM notifications
        WHERE recipient_id = ?1 AND is_read = 0
        ORDER BY created_at DESC
        "#,
    )
    .bind(recipient_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(notification_from_row).collect()
}

/// Fan out one notification per current member of the conversation,
/// skipping the sender. Runs against the caller's open transaction.
pub(crate) async fn fan_out_to_members(
    conn: &mut SqliteConnection,
    conversation_id: Uuid,
    sender_id: Uuid,
    kind: NotificationKind,
    content: &str,
    now: DateTime<Utc>,
) -> ChatResult<u64> {
    let recipients = sqlx::query(
        r#"
        SELECT user_id FROM members
        WHERE conversation_id = ?1 AND user_id <> ?2
        "#,
    )
    .bind(conversation_id)
    .bind(sender_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut count = 0u64;
    for row in recipients {
        let recipient_id: Uuid = row.get("user_id");
        insert_notification(&mut *conn, sender_id, recipient_id, kind, content, now).await?;
        count += 1;
    }

    tracing::debug!(conversation_id = %conversation_id, count, "notifications fanned out");
    Ok(count)
}

pub(crate) async fn insert_notification(
    conn: &mut SqliteConnection,
    sender_id: Uuid,
    recipient_id: Uuid,
    kind: NotificationKind,
    content: &str,
    now: DateTime<Utc>,
) -> ChatResult<Notification> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO notifications (id, sender_id, recipient_id, kind, content, is_read, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)
        "#,
    )
    .bind(id)
    .bind(sender_id)
    .bind(recipient_id)
    .bind(kind.as_str())
    .bind(content)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Notification {
        id,
        sender_id,
        recipient_id,
        kind,
        content: content.to_string(),
        read: false,
        created_at: now,
        updated_at: now,
    })
}

fn notification_from_row(row: &SqliteRow) -> ChatResult<Notification> {
    let kind: String = row.get("kind");
    Ok(Notification {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        recipient_id: row.get("recipient_id"),
        kind: NotificationKind::from_str(&kind).ok_or_else(|| {
            ChatError::invalid_argument("kind", format!("unrecognized notification kind '{}'", kind))
        })?,
        content: row.get("content"),
        read: row.get("is_read"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
