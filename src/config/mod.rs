//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: TOML file layout (Config, IrcConfig, TimeoutsConfig, TlsConfig)
//! - [`client`]: the resolved per-run [`ClientConfig`] handed to the dispatcher
//! - [`defaults`]: serde default values
//! - [`validation`]: startup checks that report every problem at once

mod client;
pub mod defaults;
mod types;
pub mod validation;

pub use client::ClientConfig;
pub use types::{Config, ConfigError, IrcConfig, TimeoutsConfig, TlsConfig};
pub use validation::{ValidationError, validate};
