//! The interface shared by every notification channel.
//!
//! Each notifier gets the rendered message, its own list of opaque target
//! strings and a timeout, and reports per-target outcomes instead of
//! failing. [`IrcNotifier`] is the IRC implementation; other channels
//! (webhooks, email) plug in behind the same trait.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::dispatch::{Connector, DispatchReport, Dispatcher, TcpConnector};

/// Result of delivering to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Delivered { target: String },
    Failed { target: String, reason: String },
}

impl TargetOutcome {
    pub fn target(&self) -> &str {
        match self {
            Self::Delivered { target } | Self::Failed { target, .. } => target,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// A notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Deliver `message` to every target, one outcome per target in input
    /// order.
    async fn deliver(
        &self,
        message: &[String],
        targets: &[String],
        timeout: Duration,
    ) -> Vec<TargetOutcome>;
}

/// Posts notifications to IRC channels.
pub struct IrcNotifier<C = TcpConnector> {
    config: ClientConfig,
    dispatcher: Dispatcher<C>,
}

impl IrcNotifier<TcpConnector> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> IrcNotifier<C> {
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::with_connector(connector),
        }
    }
}

#[async_trait]
impl<C: Connector> Notifier for IrcNotifier<C> {
    fn name(&self) -> &'static str {
        "irc"
    }

    async fn deliver(
        &self,
        message: &[String],
        targets: &[String],
        timeout: Duration,
    ) -> Vec<TargetOutcome> {
        let config = self.config.clone().bounded_by(timeout);
        let report = self.dispatcher.deliver(message, targets, &config).await;
        outcomes(targets, report)
    }
}

/// Flatten a report into outcomes ordered like `targets`.
fn outcomes(targets: &[String], report: DispatchReport) -> Vec<TargetOutcome> {
    let mut pending: Vec<TargetOutcome> = Vec::with_capacity(targets.len());
    pending.extend(
        report
            .delivered
            .into_iter()
            .map(|target| TargetOutcome::Delivered { target }),
    );
    pending.extend(
        report
            .parse_failures
            .into_iter()
            .map(|f| TargetOutcome::Failed {
                target: f.target,
                reason: f.error.to_string(),
            }),
    );
    for failure in report.group_failures {
        let reason = failure.error.to_string();
        pending.extend(failure.targets.into_iter().map(|target| TargetOutcome::Failed {
            target,
            reason: reason.clone(),
        }));
    }

    let mut ordered = Vec::with_capacity(pending.len());
    for raw in targets {
        if let Some(idx) = pending.iter().position(|o| o.target() == raw) {
            ordered.push(pending.remove(idx));
        }
    }
    ordered.extend(pending);
    ordered
}

/// One notifier with the targets it should deliver to.
pub struct NotifyJob<'a> {
    pub notifier: &'a dyn Notifier,
    pub targets: Vec<String>,
}

/// Run every job concurrently and log each failed target.
///
/// Returns each notifier's name with its outcomes, in job order.
pub async fn notify_all(
    jobs: &[NotifyJob<'_>],
    message: &[String],
    timeout: Duration,
) -> Vec<(&'static str, Vec<TargetOutcome>)> {
    let runs = jobs.iter().map(|job| async move {
        let outcomes = job.notifier.deliver(message, &job.targets, timeout).await;
        (job.notifier.name(), outcomes)
    });
    let results = join_all(runs).await;

    for (name, outcomes) in &results {
        let mut delivered = 0;
        for outcome in outcomes {
            match outcome {
                TargetOutcome::Delivered { .. } => delivered += 1,
                TargetOutcome::Failed { target, reason } => {
                    warn!(notifier = *name, raw_target = %target, reason = %reason, "delivery failed");
                }
            }
        }
        info!(notifier = *name, delivered, total = outcomes.len(), "notifier finished");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::group::GroupKey;
    use std::sync::Mutex;
    use tokio::io::DuplexStream;

    struct Refusing;

    #[async_trait]
    impl Connector for Refusing {
        type Stream = DuplexStream;

        async fn connect(
            &self,
            key: &GroupKey,
            _config: &ClientConfig,
        ) -> Result<DuplexStream, NotifyError> {
            Err(NotifyError::Closed {
                host: key.host.clone(),
            })
        }
    }

    /// Records what it was asked to deliver and reports success.
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(Vec<String>, Vec<String>, Duration)>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(
            &self,
            message: &[String],
            targets: &[String],
            timeout: Duration,
        ) -> Vec<TargetOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((message.to_vec(), targets.to_vec(), timeout));
            targets
                .iter()
                .map(|t| TargetOutcome::Delivered { target: t.clone() })
                .collect()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_irc_notifier_reports_every_target_in_order() {
        let notifier = IrcNotifier::with_connector(ClientConfig::default(), Refusing);
        let targets = strings(&["a.example#one", "bogus", "b.example#two"]);

        let outcomes = notifier
            .deliver(&strings(&["hi"]), &targets, Duration::from_secs(1))
            .await;

        assert_eq!(outcomes.len(), 3);
        let order: Vec<&str> = outcomes.iter().map(TargetOutcome::target).collect();
        assert_eq!(order, vec!["a.example#one", "bogus", "b.example#two"]);
        assert!(outcomes.iter().all(|o| !o.is_delivered()));
        assert!(matches!(
            &outcomes[1],
            TargetOutcome::Failed { reason, .. } if reason == "missing #channel"
        ));
    }

    #[test]
    fn test_outcomes_keep_duplicates() {
        let report = DispatchReport {
            delivered: strings(&["h#a", "h#a"]),
            ..Default::default()
        };
        let outcomes = outcomes(&strings(&["h#a", "h#a"]), report);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(TargetOutcome::is_delivered));
    }

    #[tokio::test]
    async fn test_notify_all_fans_out() {
        let recording = Recording::default();
        let irc = IrcNotifier::with_connector(ClientConfig::default(), Refusing);
        let jobs = [
            NotifyJob {
                notifier: &recording,
                targets: strings(&["room-1", "room-2"]),
            },
            NotifyJob {
                notifier: &irc,
                targets: strings(&["irc.example.com#x"]),
            },
        ];

        let results = notify_all(&jobs, &strings(&["line"]), Duration::from_secs(3)).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "recording");
        assert_eq!(results[0].1.len(), 2);
        assert_eq!(results[1].0, "irc");
        assert!(!results[1].1[0].is_delivered());

        let calls = recording.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["line"]);
        assert_eq!(calls[0].2, Duration::from_secs(3));
    }
}
