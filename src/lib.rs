//! irc-notify - post build notifications to IRC channels.
//!
//! Targets look like `[irc://|ircs://]host[:port]#channel[,key]`. Targets on
//! the same server share one connection; each channel is joined, sent every
//! message line, and parted before the bot quits.
//!
//! ```no_run
//! use irc_notify::{ClientConfig, Dispatcher};
//!
//! # async fn run() {
//! let report = Dispatcher::new()
//!     .deliver(
//!         &["build passed".to_string()],
//!         &["irc.libera.chat#my-project".to_string()],
//!         &ClientConfig::new("my-ci-bot"),
//!     )
//!     .await;
//! assert!(report.is_complete());
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod group;
pub mod notifier;
pub mod target;
pub mod telemetry;
pub mod template;

pub use client::{ClientState, ProtocolClient};
pub use config::{ClientConfig, Config};
pub use dispatch::{Connector, DispatchReport, Dispatcher, TcpConnector};
pub use error::{NotifyError, TargetParseError};
pub use group::{ChannelGroup, GroupKey};
pub use notifier::{IrcNotifier, Notifier, TargetOutcome};
pub use target::ChannelDescriptor;
pub use template::{BuildInfo, BuildState, Template};
