//! Core configuration types.

use std::path::Path;
use std::time::Duration;

use notify_proto::TlsOptions;
use serde::Deserialize;
use thiserror::Error;

use super::client::ClientConfig;
use super::defaults::{
    default_connect_timeout, default_handshake_timeout, default_io_timeout, default_nick,
    default_true,
};
use crate::template::{BuildInfo, Template};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Notifier configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Bot identity, delivery options and targets.
    #[serde(default)]
    pub irc: IrcConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    /// The build being announced.
    #[serde(default)]
    pub build: BuildInfo,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the settings one dispatch run needs.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            nickname: self.irc.nick.clone(),
            password: self.irc.password.clone(),
            nickserv_password: self.irc.nickserv_password.clone(),
            use_notice: self.irc.use_notice,
            skip_join: self.irc.skip_join,
            channel_key: self.irc.channel_key.clone(),
            connect_timeout: Duration::from_secs(self.timeouts.connect),
            io_timeout: Duration::from_secs(self.timeouts.io),
            handshake_timeout: Duration::from_secs(self.timeouts.handshake),
            tls: TlsOptions {
                verify_certificates: self.tls.verify_certificates,
            },
            parallel_groups: self.irc.parallel_groups,
        }
    }

    /// The configured template, or the default three-line one.
    pub fn template(&self) -> Template {
        self.irc.template.clone().unwrap_or_default()
    }
}

/// The `[irc]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Nickname (and user/real name) of the bot.
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Server password, sent as PASS before registration.
    pub password: Option<String>,
    /// Sent to NickServ as `IDENTIFY` during registration.
    pub nickserv_password: Option<String>,
    /// Send NOTICE instead of PRIVMSG.
    #[serde(default)]
    pub use_notice: bool,
    /// Message channels without joining them (needs channel mode -n).
    #[serde(default)]
    pub skip_join: bool,
    /// Key used for channels whose target carries none.
    pub channel_key: Option<String>,
    pub template: Option<Template>,
    /// Notification targets, `[irc://|ircs://]host[:port]#channel[,key]`.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Deliver to different servers concurrently.
    #[serde(default)]
    pub parallel_groups: bool,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            password: None,
            nickserv_password: None,
            use_notice: false,
            skip_join: false,
            channel_key: None,
            template: None,
            channels: Vec::new(),
            parallel_groups: false,
        }
    }
}

/// The `[timeouts]` section, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect: u64,
    /// Bound on every single write, and on the drain after QUIT.
    #[serde(default = "default_io_timeout")]
    pub io: u64,
    /// How long to wait for the first numeric reply after registering.
    #[serde(default = "default_handshake_timeout")]
    pub handshake: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            connect: default_connect_timeout(),
            io: default_io_timeout(),
            handshake: default_handshake_timeout(),
        }
    }
}

/// The `[tls]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Set to false only for self-signed test servers.
    #[serde(default = "default_true")]
    pub verify_certificates: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificates: true,
        }
    }
}
