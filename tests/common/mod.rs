//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server and helpers for asserting on the lines a
//! notification run sends.

pub mod server;
pub mod tls;

use std::time::Duration;

use irc_notify::ClientConfig;

#[allow(unused_imports)]
pub use server::{Behavior, MockServer};

/// Client settings with timeouts short enough for tests.
#[allow(dead_code)]
pub fn test_config() -> ClientConfig {
    let mut config = ClientConfig::new("notify-bot");
    config.connect_timeout = Duration::from_secs(2);
    config.io_timeout = Duration::from_millis(500);
    config.handshake_timeout = Duration::from_secs(2);
    config
}

#[allow(dead_code)]
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
