//! Telemetry utilities: span constructors and log-safe command rendering.

use notify_proto::{Command, Message};

/// Render an outbound command for trace logs with credentials masked.
pub fn redacted(command: &Command) -> String {
    match command {
        Command::PASS(_) => "PASS ****".to_string(),
        Command::PRIVMSG(target, text)
            if target.eq_ignore_ascii_case("NickServ")
                && text.to_ascii_uppercase().starts_with("IDENTIFY") =>
        {
            format!("PRIVMSG {} :IDENTIFY ****", target)
        }
        other => Message::from(other.clone())
            .to_line()
            .unwrap_or_else(|_| other.name()),
    }
}

/// Standardized span constructors for notification delivery.
pub mod spans {
    use tracing::{Span, info_span};

    use crate::group::GroupKey;

    /// Create a span for one connection group.
    pub fn group(key: &GroupKey) -> Span {
        info_span!("group", host = %key.host, port = key.port(), tls = key.tls)
    }

    /// Create a span for one raw target string.
    pub fn target(raw: &str) -> Span {
        info_span!("target", raw_target = %raw)
    }

    /// Create a span for delivery to one channel.
    pub fn channel(name: &str) -> Span {
        info_span!("channel", channel = %name)
    }
}
