//! Notification dispatch: parse targets, group them, drive one client per group.
//!
//! Delivery is best-effort. A malformed target is skipped, and a failing
//! group is closed and reported while the remaining groups still run.

use async_trait::async_trait;
use futures_util::future::join_all;
use notify_proto::NotifyStream;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{Instrument, debug, info, warn};

use crate::client::{self, ProtocolClient};
use crate::config::ClientConfig;
use crate::error::{NotifyError, TargetParseError};
use crate::group::{ChannelGroup, GroupKey, group};
use crate::target::ChannelDescriptor;
use crate::telemetry::spans;

/// Opens the byte stream for a connection group.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Send + Sync + 'static;

    async fn connect(
        &self,
        key: &GroupKey,
        config: &ClientConfig,
    ) -> Result<Self::Stream, NotifyError>;
}

/// TCP (and TLS for `ircs://`) connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Stream = NotifyStream;

    async fn connect(
        &self,
        key: &GroupKey,
        config: &ClientConfig,
    ) -> Result<NotifyStream, NotifyError> {
        client::open_stream(key, config).await
    }
}

/// A target that could not be parsed.
#[derive(Debug)]
pub struct ParseFailure {
    pub target: String,
    pub error: TargetParseError,
}

/// A group whose delivery stopped early.
#[derive(Debug)]
pub struct GroupFailure {
    pub key: GroupKey,
    /// Raw targets in this group that were not delivered.
    pub targets: Vec<String>,
    pub error: NotifyError,
}

/// What happened to every target of one run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Raw targets that received every message line.
    pub delivered: Vec<String>,
    pub parse_failures: Vec<ParseFailure>,
    pub group_failures: Vec<GroupFailure>,
}

impl DispatchReport {
    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    /// Number of targets that were not delivered, for any reason.
    pub fn failed_count(&self) -> usize {
        self.parse_failures.len()
            + self
                .group_failures
                .iter()
                .map(|f| f.targets.len())
                .sum::<usize>()
    }

    /// Returns true if every target was delivered.
    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }
}

struct GroupRun {
    /// Leading channels of the group that were fully delivered.
    delivered: usize,
    error: Option<NotifyError>,
}

/// Delivers a rendered message to a list of raw targets.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<C = TcpConnector> {
    connector: C,
}

impl Dispatcher<TcpConnector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector> Dispatcher<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Send every line of `message` to every target.
    ///
    /// Never fails; per-target and per-group problems end up in the report.
    pub async fn deliver(
        &self,
        message: &[String],
        raw_targets: &[String],
        config: &ClientConfig,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut sources = Vec::with_capacity(raw_targets.len());
        let mut descriptors = Vec::with_capacity(raw_targets.len());

        for raw in raw_targets {
            let _span = spans::target(raw).entered();
            match ChannelDescriptor::parse(raw) {
                Ok(descriptor) => {
                    sources.push(raw.as_str());
                    descriptors.push(descriptor);
                }
                Err(error) => {
                    warn!(error = %error, "skipping malformed target");
                    report.parse_failures.push(ParseFailure {
                        target: raw.clone(),
                        error,
                    });
                }
            }
        }

        let groups = group(&descriptors);
        debug!(
            targets = descriptors.len(),
            groups = groups.len(),
            parallel = config.parallel_groups,
            "dispatching"
        );

        let runs = if config.parallel_groups {
            join_all(groups.iter().map(|g| self.deliver_group(g, message, config))).await
        } else {
            let mut runs = Vec::with_capacity(groups.len());
            for g in &groups {
                runs.push(self.deliver_group(g, message, config).await);
            }
            runs
        };

        for (group, run) in groups.into_iter().zip(runs) {
            let mut targets = group
                .channels
                .iter()
                .map(|c| sources[c.position].to_string());
            report.delivered.extend(targets.by_ref().take(run.delivered));

            if let Some(error) = run.error {
                let targets: Vec<String> = targets.collect();
                warn!(
                    host = %group.key.host,
                    port = group.key.port(),
                    tls = group.key.tls,
                    targets = ?targets,
                    code = error.error_code(),
                    error = %error,
                    "delivery to group failed"
                );
                report.group_failures.push(GroupFailure {
                    key: group.key,
                    targets,
                    error,
                });
            }
        }

        info!(
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "notification run finished"
        );
        report
    }

    async fn deliver_group(
        &self,
        group: &ChannelGroup,
        message: &[String],
        config: &ClientConfig,
    ) -> GroupRun {
        let mut delivered = 0;
        let result = self
            .run_group(group, message, config, &mut delivered)
            .instrument(spans::group(&group.key))
            .await;
        GroupRun {
            delivered,
            error: result.err(),
        }
    }

    async fn run_group(
        &self,
        group: &ChannelGroup,
        message: &[String],
        config: &ClientConfig,
        delivered: &mut usize,
    ) -> Result<(), NotifyError> {
        let mut client =
            ProtocolClient::connect(&self.connector, &group.key, config.clone()).await?;

        if let Err(e) = run_channels(&mut client, group, message, config, delivered).await {
            client.close().await;
            return Err(e);
        }

        // Every channel already has the message; a failed QUIT changes nothing.
        if let Err(e) = client.quit().await {
            warn!(error = %e, "QUIT failed");
        }
        Ok(())
    }
}

async fn run_channels<S>(
    client: &mut ProtocolClient<S>,
    group: &ChannelGroup,
    message: &[String],
    config: &ClientConfig,
    delivered: &mut usize,
) -> Result<(), NotifyError>
where
    S: AsyncRead + AsyncWrite + Send + Sync + 'static,
{
    client.handshake().await?;
    client.wait_for_numeric().await?;

    for target in &group.channels {
        let channel = target.channel.as_str();
        async {
            client
                .join(channel, config.join_key(target.key.as_deref()))
                .await?;
            for line in message {
                client.say(line, channel, config.use_notice).await?;
            }
            client.leave(channel).await
        }
        .instrument(spans::channel(&target.irc_channel()))
        .await?;

        *delivered += 1;
        debug!(channel = %target.irc_channel(), lines = message.len(), "delivered");
    }
    Ok(())
}
