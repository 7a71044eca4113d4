//! Contact Data Structures
//!
//! Address-book entries created when a friend request is accepted. A
//! `Contact` describes the referred user; `UserContact` links an owner to
//! the entries in their book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An address-book entry describing a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Unique contact ID
    pub id: Uuid,
    /// The user this entry refers to
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a user to a contact entry in their address book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserContact {
    pub id: Uuid,
    /// Owner of the address book
    pub user_id: Uuid,
    /// Contact entry in the book
    pub contact_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
