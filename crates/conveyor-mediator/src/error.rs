//! Mediator error types.

use thiserror::Error;

/// Errors returned by [`ChatRoom`](crate::ChatRoom) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediatorError {
    /// A member with this name already joined the room.
    #[error("user `{0}` is already a member of the room")]
    DuplicateUser(String),

    /// No member with this name is in the room.
    #[error("user `{0}` is not a member of the room")]
    UnknownUser(String),
}

/// Result type for mediator operations.
pub type MediatorResult<T> = Result<T, MediatorError>;
