//! Client stream abstraction.
//!
//! Provides a unified stream type for plaintext and TLS connections to an
//! IRC server.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as ClientTlsStream;

/// A connection to an IRC server, with or without TLS.
///
/// The protocol layer above is agnostic to the transport security.
pub enum NotifyStream {
    /// Plaintext TCP connection.
    Plain(TcpStream),
    /// TLS-encrypted client connection.
    Tls(Box<ClientTlsStream<TcpStream>>),
}

impl NotifyStream {
    /// Returns true if this is a TLS-encrypted connection.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl AsyncRead for NotifyStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NotifyStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            NotifyStream::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NotifyStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            NotifyStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            NotifyStream::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NotifyStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            NotifyStream::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            NotifyStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            NotifyStream::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
