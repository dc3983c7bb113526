//! Notification target parsing.
//!
//! A target names one channel and how to reach its server:
//!
//! ```text
//! [irc://|ircs://]host[:port]#channel[,key]
//! ```
//!
//! Only the `ircs://` prefix turns on TLS. The first `#` separates the
//! endpoint from the channel, so `host##doublehash` and
//! `host#%23doublehash` both name the channel `#doublehash`.

use std::fmt;
use std::str::FromStr;

use crate::error::TargetParseError;

/// Port used when a target does not name one.
pub const DEFAULT_PORT: u16 = 6667;

/// A parsed notification target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub host: String,
    /// Port exactly as given in the target; `None` means "not specified".
    pub port: Option<u16>,
    pub tls: bool,
    /// Channel name with the separating `#` removed.
    pub channel: String,
    /// Join key from a trailing `,key`.
    pub key: Option<String>,
}

impl ChannelDescriptor {
    /// Parse a raw target string.
    pub fn parse(raw: &str) -> Result<Self, TargetParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TargetParseError::Empty);
        }

        let hash = raw.find('#');
        let (tls, rest) = match raw.find("://") {
            Some(pos) if hash.is_none_or(|h| pos < h) => {
                let scheme = &raw[..pos];
                let tls = match scheme.to_ascii_lowercase().as_str() {
                    "irc" => false,
                    "ircs" => true,
                    _ => return Err(TargetParseError::UnknownScheme(scheme.to_string())),
                };
                (tls, &raw[pos + 3..])
            }
            _ => (false, raw),
        };

        let (endpoint, channel_part) = rest
            .split_once('#')
            .ok_or(TargetParseError::MissingChannel)?;

        let (host, port) = match endpoint.split_once(':') {
            Some((host, port)) => (host, Some(parse_port(port)?)),
            None => (endpoint, None),
        };
        if host.is_empty() {
            return Err(TargetParseError::EmptyHost);
        }
        if host.chars().any(|c| c.is_whitespace() || c == '/' || c == ',') {
            return Err(TargetParseError::InvalidHost(host.to_string()));
        }

        let (channel, key) = match channel_part.split_once(',') {
            Some((channel, key)) => (channel, Some(parse_key(key)?)),
            None => (channel_part, None),
        };

        Ok(Self {
            host: host.to_string(),
            port,
            tls,
            channel: decode_channel(channel)?,
            key,
        })
    }

    /// The port to dial: the explicit one, or 6667.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Whether the target spelled out a port.
    pub fn explicit_port(&self) -> bool {
        self.port.is_some()
    }

    /// The channel as it appears in JOIN/PART/PRIVMSG (`#` + name).
    pub fn irc_channel(&self) -> String {
        format!("#{}", self.channel)
    }
}

fn parse_port(port: &str) -> Result<u16, TargetParseError> {
    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(TargetParseError::InvalidPort(port.to_string())),
    }
}

fn parse_key(key: &str) -> Result<String, TargetParseError> {
    if key.is_empty() || key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TargetParseError::InvalidKey);
    }
    Ok(key.to_string())
}

fn decode_channel(channel: &str) -> Result<String, TargetParseError> {
    let decoded = urlencoding::decode(channel)
        .map_err(|_| TargetParseError::InvalidChannel(channel.to_string()))?;
    if decoded.is_empty() {
        return Err(TargetParseError::EmptyChannel);
    }
    if decoded
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == ',')
    {
        return Err(TargetParseError::InvalidChannel(decoded.into_owned()));
    }
    Ok(decoded.into_owned())
}

impl FromStr for ChannelDescriptor {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical target string; parses back to an equal descriptor.
impl fmt::Display for ChannelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.tls { "ircs://" } else { "irc://" })?;
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "#{}", self.channel.replace('%', "%25"))?;
        if let Some(key) = &self.key {
            write!(f, ",{}", key)?;
        }
        Ok(())
    }
}
