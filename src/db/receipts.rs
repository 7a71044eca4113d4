//! Database operations for read receipts
//!
//! One receipt per (message, reader) pair, created once and never
//! deleted. Marking is idempotent: the composite key absorbs repeats.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::conversations;
use crate::error::{ChatError, ChatResult};
use crate::models::ReadReceipt;

/// Mark a message as seen by a user.
///
/// The message must exist (`NotFound`) and the seener must currently be
/// a member of its conversation (`PermissionDenied`); both are checked
/// in the same transaction as the insert. Repeated calls succeed and
/// leave exactly one receipt row.
pub async fn mark_seen(
    pool: &SqlitePool,
    message_id: Uuid,
    seener_id: Uuid,
) -> ChatResult<ReadReceipt> {
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    let row = sqlx::query("SELECT conversation_id FROM messages WHERE id = ?1")
        .bind(message_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ChatError::not_found("message", message_id))?;
    let conversation_id: Uuid = row.get("conversation_id");

    if !conversations::is_member_tx(&mut *tx, conversation_id, seener_id).await? {
        return Err(ChatError::permission_denied(
            "only members may mark messages seen",
        ));
    }

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO read_receipts (message_id, seener_id, conversation_id, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(message_id)
    .bind(seener_id)
    .bind(conversation_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // the insert may have been a no-op, so read the surviving row back
    let row = sqlx::query(
        r#"
        SELECT message_id, seener_id, conversation_id, created_at
        FROM read_receipts
        WHERE message_id = ?1 AND seener_id = ?2
        "#,
    )
    .bind(message_id)
    .bind(seener_id)
    .fetch_one(&mut *tx)
    .await?;

    let receipt = ReadReceipt {
        message_id: row.get("message_id"),
        seener_id: row.get("seener_id"),
        conversation_id: row.get("conversation_id"),
        created_at: row.get("created_at"),
    };

    tx.commit().await?;
    Ok(receipt)
}

/// Get the users who have seen a message, in marking order
pub async fn seen_by(pool: &SqlitePool, message_id: Uuid) -> ChatResult<Vec<Uuid>> {
    let rows = sqlx::query(
        r#"
        SELECT seener_id FROM read_receipts
        WHERE message_id = ?1
        ORDER BY created_at ASC
        "#,
    )
    .bind(message_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.get("seener_id")).collect())
}
