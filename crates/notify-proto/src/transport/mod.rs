//! IRC transport layer for async I/O.
//!
//! - [`connect`]: dial a server over TCP, upgrading to TLS when asked
//! - [`split`]: turn any duplex stream into a line reader and a message
//!   writer that can live on different tasks
//!
//! ```ignore
//! use notify_proto::transport::{self, TlsOptions};
//!
//! let stream = transport::connect("irc.libera.chat", 6697, true, &TlsOptions::default()).await?;
//! let (mut reader, mut writer) = transport::split(stream);
//! writer.send(Message::from(Command::NICK("bot".into()))).await?;
//! while let Some(line) = reader.next().await { /* ... */ }
//! ```

mod error;
mod stream;
mod tls;

pub use error::TransportError;
pub use stream::NotifyStream;
pub use tls::TlsOptions;

use tls::upgrade_to_tls;

use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::warn;

use crate::irc::IrcCodec;
use crate::line::LineCodec;

/// Maximum IRC line length accepted from or sent to a server (8191 bytes,
/// the modern convention for lines that may carry IRCv3 tags).
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Read half of a split connection, yielding raw server lines.
pub type IrcReader<S> = FramedRead<ReadHalf<S>, LineCodec>;

/// Write half of a split connection, accepting [`Message`](crate::Message)s.
pub type IrcWriter<S> = FramedWrite<WriteHalf<S>, IrcCodec>;

/// Open a connection to `host:port`, wrapped in TLS when `tls` is set.
pub async fn connect(
    host: &str,
    port: u16,
    tls: bool,
    options: &TlsOptions,
) -> Result<NotifyStream, TransportError> {
    let addr = format!("{}:{}", host, port);
    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| TransportError::Connect { addr, source })?;

    if let Err(e) = enable_keepalive(&tcp_stream) {
        warn!("failed to enable TCP keepalive: {}", e);
    }

    if tls {
        let tls_stream = upgrade_to_tls(tcp_stream, host, options).await?;
        Ok(NotifyStream::Tls(Box::new(tls_stream)))
    } else {
        Ok(NotifyStream::Plain(tcp_stream))
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};
    use std::time::Duration;

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

/// Split a connected stream into a line reader and a message writer.
pub fn split<S>(stream: S) -> (IrcReader<S>, IrcWriter<S>)
where
    S: AsyncRead + AsyncWrite,
{
    let (read, write) = tokio::io::split(stream);
    (
        FramedRead::new(read, LineCodec::with_max_len(MAX_IRC_LINE_LEN)),
        FramedWrite::new(write, IrcCodec::with_max_len(MAX_IRC_LINE_LEN)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, Message};
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_split_reads_lines_and_writes_messages() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (mut reader, mut writer) = split(client);

        server.write_all(b"PING one\r\nPING two\r\n").await.unwrap();
        assert_eq!(reader.next().await.unwrap().unwrap(), "PING one");
        assert_eq!(reader.next().await.unwrap().unwrap(), "PING two");

        writer
            .send(Message::from(Command::PONG("one".to_string())))
            .await
            .unwrap();
        let mut buf = [0u8; 64];
        let n = server.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"PONG one\r\n");
    }

    #[tokio::test]
    async fn test_reader_ends_on_close() {
        let (client, server) = tokio::io::duplex(64);
        let (mut reader, _writer) = split(client);
        drop(server);
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_plain() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let stream = connect("127.0.0.1", port, false, &TlsOptions::default())
            .await
            .unwrap();
        assert!(!stream.is_tls());
        accept.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port, false, &TlsOptions::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Connect { .. }));
    }
}
