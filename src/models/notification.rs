//! Notification Data Structures
//!
//! Notification rows are the durable record of fan-out; push or email
//! delivery is an external collaborator that polls unread rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recognized notification kinds.
///
/// A single tagged kind replaces the typed lookup table the data model
/// grew out of; the kind string is stored alongside the row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A message arrived in one of the recipient's conversations
    Message,
    /// Someone sent the recipient a friend request
    FriendRequest,
    /// The recipient's friend request was accepted
    FriendAccepted,
}

impl NotificationKind {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Message => "message",
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::FriendAccepted => "friend_accepted",
        }
    }

    /// Parse from string (database)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "message" => Some(NotificationKind::Message),
            "friend_request" => Some(NotificationKind::FriendRequest),
            "friend_accepted" => Some(NotificationKind::FriendAccepted),
            _ => None,
        }
    }
}

/// A notification addressed to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,
    /// User whose action produced the notification
    pub sender_id: Uuid,
    /// User the notification is addressed to
    pub recipient_id: Uuid,
    /// What happened
    pub kind: NotificationKind,
    /// Display content
    pub content: String,
    /// Starts false; flips to true once and never back
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            NotificationKind::Message,
            NotificationKind::FriendRequest,
            NotificationKind::FriendAccepted,
        ] {
            assert_eq!(NotificationKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::from_str("mention"), None);
    }

    #[test]
    fn test_kind_wire_names_are_snake_case() {
        let json = serde_json::to_string(&NotificationKind::FriendAccepted).unwrap();
        assert_eq!(json, "\"friend_accepted\"");
    }
}
