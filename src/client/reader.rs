//! Background line reader: answers PING and flags the first numeric reply.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use notify_proto::{Command, IrcReader, IrcWriter, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, watch};
use tokio::time;
use tracing::{debug, trace, warn};

use crate::error::NotifyError;

/// Write half shared by caller commands and the PONG responder.
pub(crate) type SharedWriter<S> = Arc<Mutex<IrcWriter<S>>>;

pub(crate) struct Reader<S> {
    pub lines: IrcReader<S>,
    pub writer: SharedWriter<S>,
    pub numeric: watch::Sender<bool>,
    pub host: String,
    pub io_timeout: Duration,
}

impl<S> Reader<S>
where
    S: AsyncRead + AsyncWrite + Send + Sync + 'static,
{
    /// Read until end of stream or a read/write failure.
    ///
    /// Dropping `numeric` on return wakes anyone still waiting for the
    /// handshake.
    pub async fn run(mut self) {
        while let Some(next) = self.lines.next().await {
            let line = match next {
                Ok(line) => line,
                Err(e) => {
                    warn!(host = %self.host, error = %e, "read failed");
                    return;
                }
            };

            let msg = match line.parse::<Message>() {
                Ok(msg) => msg,
                Err(e) => {
                    debug!(host = %self.host, error = %e, "skipping unparsable line");
                    continue;
                }
            };

            if msg.is_numeric() {
                let first = self.numeric.send_if_modified(|seen| !std::mem::replace(seen, true));
                if first {
                    debug!(host = %self.host, line = %line, "registration acknowledged");
                }
                continue;
            }

            match msg.command {
                Command::PING(token) => {
                    if let Err(e) = self.pong(token).await {
                        warn!(host = %self.host, error = %e, "PONG failed");
                        return;
                    }
                }
                Command::ERROR(reason) => {
                    warn!(host = %self.host, reason = %reason, "server sent ERROR");
                }
                _ => trace!(host = %self.host, line = %line, "<-"),
            }
        }

        debug!(host = %self.host, "server closed connection");
    }

    async fn pong(&self, token: String) -> Result<(), NotifyError> {
        trace!(host = %self.host, token = %token, "PING -> PONG");
        let reply = Message::from(Command::PONG(token));
        let send = async {
            let mut writer = self.writer.lock().await;
            writer.send(reply).await
        };
        match time::timeout(self.io_timeout, send).await {
            Ok(result) => result.map_err(NotifyError::from),
            Err(_) => Err(NotifyError::Timeout {
                operation: "PONG",
                timeout: self.io_timeout,
            }),
        }
    }
}
