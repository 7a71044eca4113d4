//! XFChat - Chat Backend Consistency Core
//!
//! XFChat owns the consistency rules of a chat backend: conversation
//! membership, totally-ordered message delivery, per-reader read
//! receipts, notification fan-out, and the friend-request/contact social
//! graph. Transport, rendering, identity issuance, and blob storage live
//! outside; the core receives an already-authenticated `UserId` and does
//! all authorization (membership, ownership) itself against a single
//! SQLite store.
//!
//! # Module Structure
//!
//! - **`config`** - explicit storage configuration, pool construction,
//!   schema migrations
//! - **`models`** - serializable domain types, one entity per file
//! - **`db`** - the operations, free async functions over the pool
//! - **`error`** - the [`ChatError`] taxonomy every operation returns
//!
//! # Usage
//!
//! ```rust,no_run
//! use uuid::Uuid;
//! use xfchat::db::{conversations, messages};
//! use xfchat::models::MessageKind;
//! use xfchat::CoreConfig;
//!
//! # async fn example() -> xfchat::ChatResult<()> {
//! let pool = CoreConfig::new("sqlite://xfchat.db").connect().await?;
//!
//! let creator = Uuid::new_v4();
//! let conversation = conversations::create_conversation(&pool, creator, "Team").await?;
//! messages::send_message(
//!     &pool,
//!     conversation.id,
//!     creator,
//!     MessageKind::Text,
//!     "hi",
//!     None,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency
//!
//! Every operation is all-or-nothing: validations and their dependent
//! writes share one transaction, so a membership check that passed can
//! never be overtaken by a concurrent removal before the write commits.
//! Within a conversation, messages carry a sequence number assigned
//! under that transaction, giving a total order consistent with
//! (created, insertion) even under concurrent senders. Unrelated
//! conversations never serialize against each other at this layer.
//!
//! # Error Handling
//!
//! All fallible operations return [`ChatResult`]. Idempotent operations
//! (re-adding a member, re-marking a message seen, re-reading a
//! notification) report success rather than an error, so callers can
//! distinguish "already done" from `PermissionDenied` and `NotFound`.

/// Explicit storage configuration
pub mod config;

/// Database operations
pub mod db;

/// Core error types
pub mod error;

/// Domain models
pub mod models;

// Re-export commonly used types for convenience
pub use config::CoreConfig;
pub use error::{ChatError, ChatResult};
