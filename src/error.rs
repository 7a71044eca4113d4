//! Core Error Types
//!
//! Every fallible operation in the crate returns [`ChatError`]. The variants
//! are the taxonomy callers dispatch on: absent entities, authorization
//! failures, malformed input, uniqueness conflicts, and state-machine
//! violations. Storage failures are wrapped, with unique-constraint
//! violations surfaced as [`ChatError::Conflict`] so a racing writer can
//! retry.
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.

use thiserror::Error;

/// Result alias used across the crate.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors produced by the chat core.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// Identifier that missed
        id: String,
    },

    /// The caller is not authorized for the entity or action.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Human-readable error message
        message: String,
    },

    /// Malformed or out-of-policy input.
    #[error("invalid argument '{field}': {message}")]
    InvalidArgument {
        /// The argument that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// A uniqueness rule was violated. Safe to retry once.
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// The action is not valid for the entity's current state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable error message
        message: String,
    },

    /// Underlying storage error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl ChatError {
    /// Create a new not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a new permission-denied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a new invalid-argument error
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Map a storage error to [`ChatError::Conflict`] when it carries a
    /// unique-constraint violation, passing other errors through unchanged.
    pub(crate) fn from_unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => Self::conflict(message),
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = ChatError::not_found("conversation", "1234");
        match error {
            ChatError::NotFound { entity, id } => {
                assert_eq!(entity, "conversation");
                assert_eq!(id, "1234");
            }
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_invalid_argument_error() {
        let error = ChatError::invalid_argument("title", "title cannot be empty");
        match error {
            ChatError::InvalidArgument { field, message } => {
                assert_eq!(field, "title");
                assert_eq!(message, "title cannot be empty");
            }
            _ => panic!("Expected InvalidArgument"),
        }
    }

    #[test]
    fn test_error_display() {
        let error = ChatError::permission_denied("sender is not a member");
        let display = format!("{}", error);
        assert!(display.contains("permission denied"));
        assert!(display.contains("sender is not a member"));

        let error = ChatError::conflict("a pending request already exists");
        assert!(format!("{}", error).starts_with("conflict"));
    }

    #[test]
    fn test_invalid_state_error() {
        let error = ChatError::invalid_state("request is already accepted");
        match error {
            ChatError::InvalidState { message } => {
                assert_eq!(message, "request is already accepted");
            }
            _ => panic!("Expected InvalidState"),
        }
    }

    #[test]
    fn test_from_unique_violation_passthrough() {
        // RowNotFound carries no database error, so it must pass through
        let error = ChatError::from_unique_violation(sqlx::Error::RowNotFound, "duplicate");
        match error {
            ChatError::Database(_) => {}
            _ => panic!("Expected Database passthrough"),
        }
    }
}
