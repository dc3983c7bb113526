//! Grouping of targets by connection.
//!
//! Targets that share a host, port and TLS flag are delivered over one
//! connection. "No port given" and "port 6667 given" are different keys,
//! so they get separate connections even though they dial the same port.

use std::collections::HashMap;
use std::fmt;

use crate::target::{ChannelDescriptor, DEFAULT_PORT};

/// Identity of one outbound connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub host: String,
    pub port: Option<u16>,
    pub tls: bool,
}

impl GroupKey {
    /// The port to dial.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

impl From<&ChannelDescriptor> for GroupKey {
    fn from(d: &ChannelDescriptor) -> Self {
        Self {
            host: d.host.clone(),
            port: d.port,
            tls: d.tls,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port())?;
        if self.tls {
            f.write_str(" (tls)")?;
        }
        Ok(())
    }
}

/// One channel to deliver to within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    /// Channel name with the separating `#` removed.
    pub channel: String,
    pub key: Option<String>,
    /// Index of the descriptor this came from in the grouped input.
    pub position: usize,
}

impl ChannelTarget {
    /// The channel as sent on the wire.
    pub fn irc_channel(&self) -> String {
        format!("#{}", self.channel)
    }
}

/// All channels that share one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub key: GroupKey,
    pub channels: Vec<ChannelTarget>,
}

/// Partition descriptors by [`GroupKey`].
///
/// Groups come back in order of first appearance, and channels keep their
/// input order within a group. Repeated channels are kept as given.
pub fn group(descriptors: &[ChannelDescriptor]) -> Vec<ChannelGroup> {
    let mut groups: Vec<ChannelGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for (position, d) in descriptors.iter().enumerate() {
        let key = GroupKey::from(d);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(ChannelGroup {
                key,
                channels: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].channels.push(ChannelTarget {
            channel: d.channel.clone(),
            key: d.key.clone(),
            position,
        });
    }

    groups
}
