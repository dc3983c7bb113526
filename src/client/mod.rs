//! Minimal IRC protocol client for posting notifications.
//!
//! A [`ProtocolClient`] owns one connection. Caller commands go out in the
//! order they are issued; a background [`reader`] task answers PING with
//! PONG through the same writer and flags the first numeric reply, which is
//! what [`ProtocolClient::wait_for_numeric`] waits on.

mod reader;
mod state;

pub use state::ClientState;

use std::sync::Arc;

use futures_util::SinkExt;
use notify_proto::{Command, Message, NotifyStream, transport};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, trace};

use crate::config::ClientConfig;
use crate::dispatch::Connector;
use crate::error::NotifyError;
use crate::group::GroupKey;
use crate::telemetry;
use reader::{Reader, SharedWriter};

/// Open the transport for a group, bounded by `connect_timeout`.
pub async fn open_stream(
    key: &GroupKey,
    config: &ClientConfig,
) -> Result<NotifyStream, NotifyError> {
    let port = key.port();
    let connect = transport::connect(&key.host, port, key.tls, &config.tls);
    match time::timeout(config.connect_timeout, connect).await {
        Ok(Ok(stream)) => {
            debug!(host = %key.host, port, tls = stream.is_tls(), "transport open");
            Ok(stream)
        }
        Ok(Err(source)) => Err(NotifyError::Connect {
            host: key.host.clone(),
            port,
            source,
        }),
        Err(_) => Err(NotifyError::Timeout {
            operation: "connect",
            timeout: config.connect_timeout,
        }),
    }
}

/// One registered IRC session.
pub struct ProtocolClient<S> {
    host: String,
    config: ClientConfig,
    state: ClientState,
    writer: SharedWriter<S>,
    numeric: watch::Receiver<bool>,
    reader: Option<JoinHandle<()>>,
}

impl<S> ProtocolClient<S>
where
    S: AsyncRead + AsyncWrite + Send + Sync + 'static,
{
    /// Open the connection for `key` through `connector` and start the
    /// background reader.
    pub async fn connect<C>(
        connector: &C,
        key: &GroupKey,
        config: ClientConfig,
    ) -> Result<Self, NotifyError>
    where
        C: Connector<Stream = S>,
    {
        let stream = connector.connect(key, &config).await?;
        info!(host = %key.host, port = key.port(), tls = key.tls, "connected");
        Ok(Self::new(stream, key.host.clone(), config))
    }

    /// Wrap an already open stream and start the background reader.
    pub fn new(stream: S, host: impl Into<String>, config: ClientConfig) -> Self {
        let host = host.into();
        let (lines, writer) = transport::split(stream);
        let writer = Arc::new(Mutex::new(writer));
        let (numeric_tx, numeric_rx) = watch::channel(false);

        let reader = Reader {
            lines,
            writer: Arc::clone(&writer),
            numeric: numeric_tx,
            host: host.clone(),
            io_timeout: config.io_timeout,
        };
        let handle = tokio::spawn(reader.run());

        let mut client = Self {
            host,
            config,
            state: ClientState::Disconnected,
            writer,
            numeric: numeric_rx,
            reader: Some(handle),
        };
        client.transition(ClientState::Connecting);
        client
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Whether the server has sent a numeric reply yet.
    pub fn numeric_received(&self) -> bool {
        *self.numeric.borrow()
    }

    /// Send PASS, NICK, NickServ IDENTIFY and USER, in that order.
    ///
    /// Each part is optional except NICK and USER.
    pub async fn handshake(&mut self) -> Result<(), NotifyError> {
        self.require("register", &[ClientState::Connecting])?;

        if let Some(password) = self.config.password.clone() {
            self.send(Command::PASS(password)).await?;
        }

        let nick = self.config.nickname.clone();
        self.send(Command::NICK(nick.clone())).await?;

        if let Some(password) = self.config.nickserv_password.clone() {
            self.send(Command::PRIVMSG(
                "NickServ".to_string(),
                format!("IDENTIFY {}", password),
            ))
            .await?;
        }

        self.send(Command::USER(nick.clone(), nick.clone(), nick.clone(), nick))
            .await?;

        self.transition(ClientState::Authenticating);
        Ok(())
    }

    /// Wait for the server to acknowledge registration.
    ///
    /// Fails with [`NotifyError::AuthTimeout`] after `handshake_timeout`, or
    /// with [`NotifyError::Closed`] if the connection ends first.
    pub async fn wait_for_numeric(&mut self) -> Result<(), NotifyError> {
        self.require("wait for registration", &[ClientState::Authenticating])?;

        let timeout = self.config.handshake_timeout;
        let outcome = time::timeout(timeout, self.numeric.wait_for(|seen| *seen))
            .await
            .map(|seen| seen.map(|_| ()));

        match outcome {
            Ok(Ok(())) => {
                self.transition(ClientState::Ready);
                Ok(())
            }
            Ok(Err(_)) => Err(NotifyError::Closed {
                host: self.host.clone(),
            }),
            Err(_) => Err(NotifyError::AuthTimeout {
                host: self.host.clone(),
                timeout,
            }),
        }
    }

    /// JOIN `#channel`, with a key if given. No-op when joins are skipped.
    pub async fn join(&mut self, channel: &str, key: Option<&str>) -> Result<(), NotifyError> {
        self.require("join", &[ClientState::Ready])?;
        if self.config.skip_join {
            return Ok(());
        }

        self.transition(ClientState::Joining);
        self.send(Command::JOIN(
            format!("#{}", channel),
            key.map(str::to_string),
        ))
        .await?;
        self.transition(ClientState::Joined);
        Ok(())
    }

    /// Send one message line to `#channel` as PRIVMSG, or NOTICE if `notice`.
    pub async fn say(&mut self, line: &str, channel: &str, notice: bool) -> Result<(), NotifyError> {
        if self.config.skip_join {
            self.require("send", &[ClientState::Ready, ClientState::Joined])?;
        } else {
            self.require("send", &[ClientState::Joined])?;
        }

        let target = format!("#{}", channel);
        let command = if notice {
            Command::NOTICE(target, line.to_string())
        } else {
            Command::PRIVMSG(target, line.to_string())
        };
        self.send(command).await
    }

    /// PART `#channel`. No-op when joins are skipped.
    pub async fn leave(&mut self, channel: &str) -> Result<(), NotifyError> {
        if self.config.skip_join {
            return self.require("part", &[ClientState::Ready]);
        }
        self.require("part", &[ClientState::Joined])?;

        self.transition(ClientState::Parting);
        self.send(Command::PART(format!("#{}", channel))).await?;
        self.transition(ClientState::Ready);
        Ok(())
    }

    /// Send QUIT, wait for the server to hang up, then close.
    ///
    /// The wait is bounded by `io_timeout`; the connection is closed either
    /// way and the client ends up [`ClientState::Closed`].
    pub async fn quit(&mut self) -> Result<(), NotifyError> {
        self.require("quit", &[ClientState::Ready, ClientState::Joined])?;

        self.transition(ClientState::Quitting);
        let sent = self.send(Command::QUIT(None)).await;
        self.shutdown(sent.is_ok()).await;
        sent
    }

    /// Drop the connection without QUIT.
    pub async fn close(&mut self) {
        if !self.state.is_terminal() {
            self.shutdown(false).await;
        }
    }

    async fn shutdown(&mut self, drain: bool) {
        let timeout = self.config.io_timeout;

        if let Some(mut reader) = self.reader.take() {
            if !drain {
                reader.abort();
            } else if time::timeout(timeout, &mut reader).await.is_err() {
                debug!(host = %self.host, "server kept the connection open after QUIT");
                reader.abort();
            }
        }

        let close = async {
            let mut writer = self.writer.lock().await;
            writer.close().await
        };
        match time::timeout(timeout, close).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(host = %self.host, error = %e, "close failed"),
            Err(_) => debug!(host = %self.host, "close timed out"),
        }

        self.transition(ClientState::Closed);
    }

    async fn send(&self, command: Command) -> Result<(), NotifyError> {
        trace!(host = %self.host, line = %telemetry::redacted(&command), "->");

        let timeout = self.config.io_timeout;
        let message = Message::from(command);
        let send = async {
            let mut writer = self.writer.lock().await;
            writer.send(message).await
        };
        match time::timeout(timeout, send).await {
            Ok(result) => result.map_err(NotifyError::from),
            Err(_) => Err(NotifyError::Timeout {
                operation: "write",
                timeout,
            }),
        }
    }

    fn require(&self, operation: &'static str, allowed: &[ClientState]) -> Result<(), NotifyError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(NotifyError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: ClientState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        trace!(host = %self.host, from = ?self.state, to = ?next, "state");
        self.state = next;
    }
}

impl<S> Drop for ProtocolClient<S> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
