//! Database operations for messages
//!
//! Sending runs as one transaction: membership guard, sequence
//! assignment, insert, notification fan-out, and the conversation's
//! activity bump all commit together or not at all. Listing is keyset
//! pagination over the per-conversation sequence, so pages stay stable
//! under concurrent inserts.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::{conversations, notifications};
use crate::error::{ChatError, ChatResult};
use crate::models::{Message, MessageCursor, MessageKind, MessagePage, NotificationKind};

/// Length of the message preview carried in fan-out notifications.
const NOTIFICATION_PREVIEW_LEN: usize = 120;

/// Send a message into a conversation.
///
/// The sender must be a current member (`PermissionDenied` otherwise,
/// checked in the same transaction as the write). Attachment messages
/// must carry a non-empty `attachment_url` (`InvalidArgument`). Every
/// current member except the sender receives a `message` notification.
///
/// The message takes the next position in the conversation's total
/// order; if two senders race for the same position the loser surfaces
/// as `Conflict` and the send is safe to retry.
pub async fn send_message(
    pool: &SqlitePool,
    conversation_id: Uuid,
    sender_id: Uuid,
    kind: MessageKind,
    text: &str,
    attachment_url: Option<&str>,
) -> ChatResult<Message> {
    if kind == MessageKind::Attachment && attachment_url.map_or(true, |u| u.trim().is_empty()) {
        return Err(ChatError::invalid_argument(
            "attachment_url",
            "attachment messages require an attachment url",
        ));
    }

    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    conversations::ensure_conversation_exists(&mut *tx, conversation_id).await?;

    if !conversations::is_member_tx(&mut *tx, conversation_id, sender_id).await? {
        return Err(ChatError::permission_denied(
            "sender is not a member of the conversation",
        ));
    }

    let seq: i64 = sqlx::query(
        r#"
        SELECT COALESCE(MAX(seq), 0) + 1 AS next_seq
        FROM messages
        WHERE conversation_id = ?1
        "#,
    )
    .bind(conversation_id)
    .fetch_one(&mut *tx)
    .await?
    .get("next_seq");

    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, sender_id, kind, text, attachment_url, seq, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(id)
    .bind(conversation_id)
    .bind(sender_id)
    .bind(kind.as_str())
    .bind(text)
    .bind(attachment_url)
    .bind(seq)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| ChatError::from_unique_violation(e, "message order key collided, retry send"))?;

    let message = Message {
        id,
        conversation_id,
        sender_id,
        kind,
        text: text.to_string(),
        attachment_url: attachment_url.map(|u| u.to_string()),
        seq,
        created_at: now,
        updated_at: now,
    };

    notifications::fan_out_to_members(
        &mut *tx,
        conversation_id,
        sender_id,
        NotificationKind::Message,
        &message.preview(NOTIFICATION_PREVIEW_LEN),
        now,
    )
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(message_id = %id, conversation_id = %conversation_id, seq, "message sent");

    Ok(message)
}

/// List a conversation's messages in (created, insertion) order.
///
/// Pass the cursor from the previous page to resume after the last
/// message seen; `next_cursor` is `None` once a short page signals the
/// end.
pub async fn list_messages(
    pool: &SqlitePool,
    conversation_id: Uuid,
    after: Option<MessageCursor>,
    limit: u32,
) -> ChatResult<MessagePage> {
    let after_seq = after.map(|c| c.seq()).unwrap_or(0);

    let rows = sqlx::query(
        r#"
        SELECT id, conversation_id, sender_id, kind, text, attachment_url, seq, created_at, updated_at
        FROM messages
        WHERE conversation_id = ?1 AND seq > ?2
        ORDER BY seq ASC
        LIMIT ?3
        "#,
    )
    .bind(conversation_id)
    .bind(after_seq)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    let messages = rows
        .iter()
        .map(message_from_row)
        .collect::<ChatResult<Vec<_>>>()?;

    let next_cursor = if messages.len() == limit as usize {
        messages.last().map(Message::cursor)
    } else {
        None
    };

    Ok(MessagePage {
        messages,
        next_cursor,
    })
}

/// Get a message by ID
pub async fn get_message(pool: &SqlitePool, message_id: Uuid) -> ChatResult<Option<Message>> {
    let row = sqlx::query(
        r#"
        SELECT id, conversation_id, sender_id, kind, text, attachment_url, seq, created_at, updated_at
        FROM messages
        WHERE id = ?1
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(message_from_row).transpose()
}

fn message_from_row(row: &SqliteRow) -> ChatResult<Message> {
    let kind: String = row.get("kind");
    Ok(Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        kind: MessageKind::from_str(&kind).ok_or_else(|| {
            ChatError::invalid_argument("kind", format!("unrecognized message kind '{}'", kind))
        })?,
        text: row.get("text"),
        attachment_url: row.get("attachment_url"),
        seq: row.get("seq"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
