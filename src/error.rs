//! Unified error handling for irc-notify.
//!
//! Nothing in here is fatal to a notification run: target errors skip one
//! target, client errors abort one connection group, and the dispatcher
//! records both in its report.

use std::time::Duration;

use notify_proto::{ProtocolError, TransportError};
use thiserror::Error;

use crate::client::ClientState;

// ============================================================================
// Target Errors (parsing raw target strings)
// ============================================================================

/// Why a raw target string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetParseError {
    #[error("empty target")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnknownScheme(String),

    #[error("missing #channel")]
    MissingChannel,

    #[error("empty host")]
    EmptyHost,

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("empty channel name")]
    EmptyChannel,

    #[error("invalid channel name: {0}")]
    InvalidChannel(String),

    #[error("invalid channel key")]
    InvalidKey,
}

// ============================================================================
// Notify Errors (one connection group)
// ============================================================================

/// Errors that abort delivery to one connection group.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Opening the connection failed (TCP connect or TLS handshake).
    #[error("connect to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    /// Reading or writing on an open connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),

    /// The server never acknowledged the handshake with a numeric reply.
    #[error("no numeric reply from {host} within {timeout:?}")]
    AuthTimeout { host: String, timeout: Duration },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The server closed the connection before we were done.
    #[error("connection closed by {host}")]
    Closed { host: String },

    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ClientState,
    },
}

impl NotifyError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect_error",
            Self::Transport(_) => "transport_error",
            Self::AuthTimeout { .. } => "auth_timeout",
            Self::Timeout { .. } => "timeout",
            Self::Closed { .. } => "closed",
            Self::InvalidState { .. } => "invalid_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let timeout = NotifyError::AuthTimeout {
            host: "irc.example.com".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(timeout.error_code(), "auth_timeout");
        assert_eq!(
            timeout.to_string(),
            "no numeric reply from irc.example.com within 30s"
        );

        let closed = NotifyError::Closed {
            host: "irc.example.com".to_string(),
        };
        assert_eq!(closed.error_code(), "closed");
    }

    #[test]
    fn test_transport_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let err: NotifyError = ProtocolError::from(io).into();
        assert_eq!(err.error_code(), "transport_error");
        assert!(err.to_string().contains("broken pipe"));
    }

    #[test]
    fn test_target_error_display() {
        assert_eq!(
            TargetParseError::UnknownScheme("http".to_string()).to_string(),
            "unsupported scheme: http"
        );
        assert_eq!(
            TargetParseError::MissingChannel.to_string(),
            "missing #channel"
        );
    }
}
