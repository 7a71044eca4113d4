//! Database operations for the social graph
//!
//! Friend requests move through a fixed state machine; acceptance is the
//! only path that creates contacts, and it creates them for both sides
//! in the same transaction as the status flip.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::notifications;
use crate::error::{ChatError, ChatResult};
use crate::models::{
    Contact, FriendRequest, FriendRequestDecision, FriendRequestStatus, NotificationKind,
    UserContact,
};

/// Send a friend request.
///
/// Fails with `Conflict` when requester and receiver are the same user
/// or a pending request already exists for the ordered pair (a racing
/// duplicate trips the partial unique index and surfaces the same way).
/// The receiver is notified in the same transaction.
pub async fn send_friend_request(
    pool: &SqlitePool,
    requester_id: Uuid,
    receiver_id: Uuid,
) -> ChatResult<FriendRequest> {
    if requester_id == receiver_id {
        return Err(ChatError::conflict(
            "cannot send a friend request to yourself",
        ));
    }

    let id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    let pending = sqlx::query(
        r#"
        SELECT 1 FROM friend_requests
        WHERE requester_id = ?1 AND receiver_id = ?2 AND status = ?3
        "#,
    )
    .bind(requester_id)
    .bind(receiver_id)
    .bind(FriendRequestStatus::Pending.as_str())
    .fetch_optional(&mut *tx)
    .await?;

    if pending.is_some() {
        return Err(ChatError::conflict(
            "a pending request already exists for this pair",
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO friend_requests (id, requester_id, receiver_id, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(id)
    .bind(requester_id)
    .bind(receiver_id)
    .bind(FriendRequestStatus::Pending.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        ChatError::from_unique_violation(e, "a pending request already exists for this pair")
    })?;

    notifications::insert_notification(
        &mut *tx,
        requester_id,
        receiver_id,
        NotificationKind::FriendRequest,
        "new friend request",
        now,
    )
    .await?;

    tx.commit().await?;
    tracing::info!(request_id = %id, requester_id = %requester_id, receiver_id = %receiver_id, "friend request sent");

    Ok(FriendRequest {
        id,
        requester_id,
        receiver_id,
        status: FriendRequestStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

/// Respond to a pending friend request.
///
/// Only the receiver may accept or reject; only the requester may
/// cancel (`PermissionDenied` on role mismatch). A request that already
/// left `Pending` fails with `InvalidState`. On accept, both sides gain
/// an address-book entry for the other and the requester is notified,
/// all in one transaction.
pub async fn respond_friend_request(
    pool: &SqlitePool,
    request_id: Uuid,
    responder_id: Uuid,
    decision: FriendRequestDecision,
) -> ChatResult<FriendRequest> {
    let now = chrono::Utc::now();
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r#"
        SELECT id, requester_id, receiver_id, status, created_at, updated_at
        FROM friend_requests
        WHERE id = ?1
        "#,
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ChatError::not_found("friend request", request_id))?;

    let mut request = friend_request_from_row(&row)?;

    match decision {
        FriendRequestDecision::Accept | FriendRequestDecision::Reject => {
            if request.receiver_id != responder_id {
                return Err(ChatError::permission_denied(
                    "only the receiver may accept or reject a request",
                ));
            }
        }
        FriendRequestDecision::Cancel => {
            if request.requester_id != responder_id {
                return Err(ChatError::permission_denied(
                    "only the requester may cancel a request",
                ));
            }
        }
    }

    if request.status.is_terminal() {
        return Err(ChatError::invalid_state(format!(
            "request is already {}",
            request.status.as_str()
        )));
    }

    let status = match decision {
        FriendRequestDecision::Accept => FriendRequestStatus::Accepted,
        FriendRequestDecision::Reject => FriendRequestStatus::Rejected,
        FriendRequestDecision::Cancel => FriendRequestStatus::Cancelled,
    };

    sqlx::query("UPDATE friend_requests SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status.as_str())
        .bind(now)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

    if status == FriendRequestStatus::Accepted {
        add_contact(&mut *tx, request.receiver_id, request.requester_id, now).await?;
        add_contact(&mut *tx, request.requester_id, request.receiver_id, now).await?;

        notifications::insert_notification(
            &mut *tx,
            request.receiver_id,
            request.requester_id,
            NotificationKind::FriendAccepted,
            "your friend request was accepted",
            now,
        )
        .await?;
    }

    tx.commit().await?;
    tracing::info!(request_id = %request_id, status = status.as_str(), "friend request resolved");

    request.status = status;
    request.updated_at = now;
    Ok(request)
}

/// Get pending friend requests addressed to a user, newest first
pub async fn pending_requests_for(
    pool: &SqlitePool,
    receiver_id: Uuid,
) -> ChatResult<Vec<FriendRequest>> {
    let rows = sqlx::query(
        r#"
        SELECT id, requester_id, receiver_id, status, created_at, updated_at
        FROM friend_requests
        WHERE receiver_id = ?1 AND status = ?2
        ORDER BY created_at DESC
        "#,
    )
    .bind(receiver_id)
    .bind(FriendRequestStatus::Pending.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(friend_request_from_row).collect()
}

/// Get all contacts in a user's address book
pub async fn contacts_for_user(pool: &SqlitePool, user_id: Uuid) -> ChatResult<Vec<Contact>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.user_id, c.first_name, c.last_name, c.created_at, c.updated_at
        FROM contacts c
        INNER JOIN user_contacts uc ON c.id = uc.contact_id
        WHERE uc.user_id = ?1
        ORDER BY c.first_name ASC, c.last_name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Contact {
            id: r.get("id"),
            user_id: r.get("user_id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
        .collect())
}

/// Get the raw link rows of a user's address book
pub async fn contact_links_for(pool: &SqlitePool, user_id: Uuid) -> ChatResult<Vec<UserContact>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, contact_id, created_at, updated_at
        FROM user_contacts
        WHERE user_id = ?1
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| UserContact {
            id: r.get("id"),
            user_id: r.get("user_id"),
            contact_id: r.get("contact_id"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
        .collect())
}

/// Put `person_id` into `owner_id`'s address book: a contact row
/// describing the person plus the link row for the owner. Names come
/// from the identity mirror when it has them.
async fn add_contact(
    conn: &mut SqliteConnection,
    owner_id: Uuid,
    person_id: Uuid,
    now: DateTime<Utc>,
) -> ChatResult<Contact> {
    let names = sqlx::query("SELECT first_name, last_name FROM users WHERE id = ?1")
        .bind(person_id)
        .fetch_optional(&mut *conn)
        .await?;
    let (first_name, last_name): (String, String) = names
        .map(|r| (r.get("first_name"), r.get("last_name")))
        .unwrap_or_default();

    let contact_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO contacts (id, user_id, first_name, last_name, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(contact_id)
    .bind(person_id)
    .bind(&first_name)
    .bind(&last_name)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_contacts (user_id, contact_id, id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(owner_id)
    .bind(contact_id)
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Contact {
        id: contact_id,
        user_id: person_id,
        first_name,
        last_name,
        created_at: now,
        updated_at: now,
    })
}

fn friend_request_from_row(row: &SqliteRow) -> ChatResult<FriendRequest> {
    let status: String = row.get("status");
    Ok(FriendRequest {
        id: row.get("id"),
        requester_id: row.get("requester_id"),
        receiver_id: row.get("receiver_id"),
        status: FriendRequestStatus::from_str(&status).ok_or_else(|| {
            ChatError::invalid_argument("status", format!("unrecognized status '{}'", status))
        })?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
