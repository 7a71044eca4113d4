//! Message Data Structures
//!
//! Messages are totally ordered per conversation by a sequence number
//! assigned under the send transaction; the pagination cursor opaquely
//! encodes that position so listing is restartable under concurrent
//! inserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of message content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text message
    Text,
    /// Message carrying an attachment reference
    Attachment,
    /// System message (e.g. "User joined")
    System,
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Text
    }
}

impl MessageKind {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Attachment => "attachment",
            MessageKind::System => "system",
        }
    }

    /// Parse from string. Unknown kinds are rejected at the boundary, not
    /// coerced to a default.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageKind::Text),
            "attachment" => Some(MessageKind::Attachment),
            "system" => Some(MessageKind::System),
            _ => None,
        }
    }
}

/// Represents a message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    /// Kind of message
    #[serde(default)]
    pub kind: MessageKind,
    /// Message text (may be empty for non-text kinds)
    pub text: String,
    /// Opaque reference into the external blob store
    pub attachment_url: Option<String>,
    /// Position in the conversation's total order
    pub seq: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Cursor pointing at this message, for resuming a listing after it.
    pub fn cursor(&self) -> MessageCursor {
        MessageCursor::new(self.seq)
    }

    /// Get a preview of the message (first N characters)
    pub fn preview(&self, max_len: usize) -> String {
        if self.text.chars().count() <= max_len {
            self.text.clone()
        } else {
            let mut preview: String = self.text.chars().take(max_len.saturating_sub(3)).collect();
            preview.push_str("...");
            preview
        }
    }
}

/// Opaque pagination cursor over a conversation's message order.
///
/// Encodes the last-seen position; a listing resumed from the cursor
/// returns exactly the messages ordered after it, even when new messages
/// were inserted in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor(i64);

impl MessageCursor {
    pub(crate) fn new(seq: i64) -> Self {
        Self(seq)
    }

    pub(crate) fn seq(&self) -> i64 {
        self.0
    }

    /// Encode into an opaque token
    pub fn encode(&self) -> String {
        format!("{:016x}", self.0 as u64)
    }

    /// Parse a token produced by [`MessageCursor::encode`]. Returns `None`
    /// for malformed input.
    pub fn parse(token: &str) -> Option<Self> {
        u64::from_str_radix(token, 16).ok().map(|v| Self(v as i64))
    }
}

/// One page of a conversation's messages.
#[derive(Debug, Clone)]
pub struct MessagePage {
    /// Messages in ascending order
    pub messages: Vec<Message>,
    /// Cursor to fetch the next page, `None` when this page was short
    pub next_cursor: Option<MessageCursor>,
}

/// A durable marker that a user has seen a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadReceipt {
    pub message_id: Uuid,
    /// User who saw the message
    pub seener_id: Uuid,
    /// Denormalized for per-conversation queries
    pub conversation_id: Uuid,
    pub created_at: DateTime<Utc>,
}
