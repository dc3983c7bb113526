//! Wire-layer errors.
//!
//! [`ProtocolError`] is what a live connection reports. [`MessageParseError`]
//! says why one server line did not become a [`Message`](crate::Message).

use thiserror::Error;

pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// A line longer than the codec accepts, in either direction.
    #[error("line of {actual} bytes exceeds the {limit} byte limit")]
    MessageTooLong { actual: usize, limit: usize },

    #[error("refusing to send control character {0:?}")]
    IllegalControlChar(char),

    /// A parameter that would change the meaning of the line if sent:
    /// CR, LF, NUL anywhere, or a space outside the trailing slot.
    #[error("{command} has a parameter that cannot be sent")]
    InvalidParam { command: String },

    #[error("unparsable line {string:?}")]
    InvalidMessage {
        string: String,
        #[source]
        cause: MessageParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    #[error("line is empty")]
    EmptyMessage,

    #[error("missing or malformed command")]
    InvalidCommand,

    #[error("{got} parameters given, {expected} required")]
    NotEnoughArguments { expected: usize, got: usize },

    /// `@tags` with no space after them.
    #[error("tags never end")]
    UnterminatedTags,

    /// `:prefix` with no space after it.
    #[error("prefix never ends")]
    UnterminatedOrigin,
}
