//! Friend Request Data Structures
//!
//! Represents friend requests between users. A request moves through a
//! fixed state machine: `Pending` to exactly one of `Accepted`, `Rejected`
//! or `Cancelled`, all terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a friend request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    /// Request is pending
    Pending,
    /// Request was accepted by the receiver
    Accepted,
    /// Request was rejected by the receiver
    Rejected,
    /// Request was cancelled by the requester
    Cancelled,
}

impl Default for FriendRequestStatus {
    fn default() -> Self {
        FriendRequestStatus::Pending
    }
}

impl FriendRequestStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Rejected => "rejected",
            FriendRequestStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from string (database)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendRequestStatus::Pending),
            "accepted" => Some(FriendRequestStatus::Accepted),
            "rejected" => Some(FriendRequestStatus::Rejected),
            "cancelled" => Some(FriendRequestStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FriendRequestStatus::Pending)
    }
}

/// How a party responds to a pending request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestDecision {
    /// Receiver accepts; both sides gain a contact
    Accept,
    /// Receiver declines
    Reject,
    /// Requester withdraws
    Cancel,
}

/// Represents a friend request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRequest {
    /// Unique request ID
    pub id: Uuid,
    /// User who sent the request
    pub requester_id: Uuid,
    /// User who received the request
    pub receiver_id: Uuid,
    /// Current status of the request
    #[serde(default)]
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    /// Check if the request is pending
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}
