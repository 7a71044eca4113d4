//! Domain Models
//!
//! Data structures for the chat core, one entity per file:
//!
//! - `User` - identity mirror of the external provider
//! - `Conversation` / `Member` - a channel and its membership
//! - `Message` / `ReadReceipt` - ordered messages and per-reader seen markers
//! - `Notification` - durable fan-out records
//! - `Contact` / `UserContact` - the address book
//! - `FriendRequest` - the bilateral request state machine

pub mod contact;
pub mod conversation;
pub mod friend_request;
pub mod message;
pub mod notification;
pub mod user;

// Re-export all types
pub use contact::{Contact, UserContact};
pub use conversation::{Conversation, Member, MemberRole};
pub use friend_request::{FriendRequest, FriendRequestDecision, FriendRequestStatus};
pub use message::{Message, MessageCursor, MessageKind, MessagePage, ReadReceipt};
pub use notification::{Notification, NotificationKind};
pub use user::User;
