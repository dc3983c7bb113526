//! Resolved per-run client settings.

use std::time::Duration;

use notify_proto::TlsOptions;

use super::defaults;

/// Settings shared by every connection in one dispatch run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub nickname: String,
    pub password: Option<String>,
    pub nickserv_password: Option<String>,
    pub use_notice: bool,
    pub skip_join: bool,
    /// Fallback join key for channels whose target carries none.
    pub channel_key: Option<String>,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub handshake_timeout: Duration,
    pub tls: TlsOptions,
    pub parallel_groups: bool,
}

impl ClientConfig {
    /// Defaults with the given nickname.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Self::default()
        }
    }

    /// Clamp every timeout to `limit`.
    pub fn bounded_by(mut self, limit: Duration) -> Self {
        self.connect_timeout = self.connect_timeout.min(limit);
        self.io_timeout = self.io_timeout.min(limit);
        self.handshake_timeout = self.handshake_timeout.min(limit);
        self
    }

    /// Join key for a channel: its own key, else the configured fallback.
    pub fn join_key<'a>(&'a self, channel_key: Option<&'a str>) -> Option<&'a str> {
        channel_key.or(self.channel_key.as_deref())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nickname: defaults::default_nick(),
            password: None,
            nickserv_password: None,
            use_notice: false,
            skip_join: false,
            channel_key: None,
            connect_timeout: Duration::from_secs(defaults::default_connect_timeout()),
            io_timeout: Duration::from_secs(defaults::default_io_timeout()),
            handshake_timeout: Duration::from_secs(defaults::default_handshake_timeout()),
            tls: TlsOptions::default(),
            parallel_groups: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_key_prefers_channel_key() {
        let mut config = ClientConfig::default();
        assert_eq!(config.join_key(None), None);
        config.channel_key = Some("global".to_string());
        assert_eq!(config.join_key(None), Some("global"));
        assert_eq!(config.join_key(Some("own")), Some("own"));
    }

    #[test]
    fn test_bounded_by() {
        let config = ClientConfig::new("bot").bounded_by(Duration::from_secs(5));
        assert_eq!(config.nickname, "bot");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.io_timeout, Duration::from_secs(5));
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));

        let config = ClientConfig::default().bounded_by(Duration::from_secs(60));
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
    }
}
