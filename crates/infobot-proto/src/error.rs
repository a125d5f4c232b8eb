//! Protocol error types.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing or parsing IRC lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty message")]
    EmptyMessage,

    #[error("message has no command")]
    MissingCommand,
}
