//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("irc.nick is required")]
    MissingNick,
    #[error("irc.nick must not contain whitespace, got '{0}'")]
    InvalidNick(String),
    #[error("irc.channels is empty; nothing to notify")]
    NoChannels,
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, returning all errors found.
///
/// Individual targets are not checked here; a bad target is skipped at
/// delivery time without affecting the others.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let nick = &config.irc.nick;
    if nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if nick.chars().any(|c| c.is_whitespace() || c.is_control()) {
        errors.push(ValidationError::InvalidNick(nick.clone()));
    }

    if config.irc.channels.is_empty() {
        errors.push(ValidationError::NoChannels);
    }

    for (name, value) in [
        ("connect", config.timeouts.connect),
        ("io", config.timeouts.io),
        ("handshake", config.timeouts.handshake),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
