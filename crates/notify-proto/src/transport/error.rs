//! Transport error types.

use thiserror::Error;

/// Errors that can occur while opening a connection to an IRC server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// TCP connect failed (DNS resolution or socket open).
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The host cannot be used as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// The TLS handshake failed.
    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        /// Host the handshake was attempted with.
        host: String,
        /// The underlying I/O error reported by rustls.
        #[source]
        source: std::io::Error,
    },
}
