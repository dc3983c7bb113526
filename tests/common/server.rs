//! Scripted IRC server.
//!
//! Listens on `127.0.0.1:0`, records every line each connection sends, and
//! answers just enough of the protocol for a notification bot: a `001` after
//! `USER`, optional PINGs, and an `ERROR` plus hang-up after `QUIT`. A server
//! started with [`MockServer::start_tls`] speaks the same script over TLS.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_rustls::TlsAcceptor;

use super::tls;

/// How the server reacts to a session.
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Send `001` after `USER`.
    pub welcome: bool,
    /// Send `PING <token>` right after `USER`, before the welcome.
    pub ping_on_register: Option<String>,
    /// Send `PING <token>` after every `JOIN`.
    pub ping_on_join: Option<String>,
    /// Keep the connection open after `QUIT`.
    pub linger_after_quit: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            welcome: true,
            ping_on_register: None,
            ping_on_join: None,
            linger_after_quit: false,
        }
    }
}

type Sessions = Arc<Mutex<Vec<Arc<Mutex<Vec<String>>>>>>;

/// A running mock server.
pub struct MockServer {
    addr: SocketAddr,
    tls: bool,
    sessions: Sessions,
    accept: JoinHandle<()>,
}

impl MockServer {
    /// Start a server with default behavior.
    pub async fn start() -> anyhow::Result<Self> {
        Self::with_behavior(Behavior::default()).await
    }

    pub async fn with_behavior(behavior: Behavior) -> anyhow::Result<Self> {
        Self::listen(behavior, None).await
    }

    /// Start a server with default behavior behind a self-signed certificate.
    #[allow(dead_code)]
    pub async fn start_tls() -> anyhow::Result<Self> {
        Self::listen(Behavior::default(), Some(tls::self_signed_acceptor()?)).await
    }

    async fn listen(behavior: Behavior, acceptor: Option<TlsAcceptor>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let sessions: Sessions = Arc::default();
        let tls = acceptor.is_some();

        let accept = tokio::spawn({
            let sessions = Arc::clone(&sessions);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let log = Arc::new(Mutex::new(Vec::new()));
                    sessions.lock().unwrap().push(Arc::clone(&log));
                    let behavior = behavior.clone();
                    match acceptor.clone() {
                        None => {
                            tokio::spawn(serve(stream, behavior, log));
                        }
                        Some(acceptor) => {
                            tokio::spawn(async move {
                                // A client that rejects the certificate ends here.
                                if let Ok(stream) = acceptor.accept(stream).await {
                                    serve(stream, behavior, log).await;
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            tls,
            sessions,
            accept,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// A target string for `channel` on this server.
    pub fn target(&self, channel: &str) -> String {
        let scheme = if self.tls { "ircs://" } else { "" };
        format!("{}127.0.0.1:{}#{}", scheme, self.port(), channel)
    }

    /// Lines received so far, one list per connection in accept order.
    pub fn sessions(&self) -> Vec<Vec<String>> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .map(|log| log.lock().unwrap().clone())
            .collect()
    }

    /// Poll until `count` connections exist and the last line of each
    /// satisfies `done`, or two seconds pass.
    pub async fn wait_for(&self, count: usize, done: impl Fn(&str) -> bool) -> Vec<Vec<String>> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let sessions = self.sessions();
            let finished = sessions.len() >= count
                && sessions
                    .iter()
                    .all(|s| s.last().is_some_and(|line| done(line)));
            if finished || Instant::now() >= deadline {
                return sessions;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn serve<S>(stream: S, behavior: Behavior, log: Arc<Mutex<Vec<String>>>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read, mut write) = tokio::io::split(stream);
    let mut lines = BufReader::new(read).lines();
    let mut pings = 0usize;
    let mut pongs = 0usize;
    let mut quitting = false;

    while let Ok(Some(line)) = lines.next_line().await {
        log.lock().unwrap().push(line.clone());

        match line.split(' ').next().unwrap_or_default() {
            "USER" => {
                if let Some(token) = &behavior.ping_on_register {
                    send(&mut write, &format!("PING {}", token)).await;
                    pings += 1;
                }
                if behavior.welcome {
                    send(&mut write, ":mock.server 001 notify-bot :Welcome to the mock network")
                        .await;
                }
            }
            "JOIN" => {
                if let Some(token) = &behavior.ping_on_join {
                    send(&mut write, &format!("PING :{}", token)).await;
                    pings += 1;
                }
            }
            "PONG" => pongs += 1,
            "QUIT" if !behavior.linger_after_quit => quitting = true,
            _ => {}
        }

        // Hang up after QUIT, but only once every PING has been answered.
        if quitting && pongs >= pings {
            send(&mut write, "ERROR :Closing Link: notify-bot (Quit)").await;
            let _ = write.shutdown().await;
            return;
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(write: &mut W, line: &str) {
    let _ = write.write_all(format!("{}\r\n", line).as_bytes()).await;
}
