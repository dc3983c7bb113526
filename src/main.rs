//! irc-notify - send one build notification to the configured IRC channels.

use irc_notify::config::{self, Config};
use irc_notify::Dispatcher;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; CI log collectors can ask for JSON lines
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("IRC_NOTIFY_LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "notify.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %config_path, "{}", e);
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    let message = config.template().render(&config.build);
    info!(
        repository = %config.build.repository,
        build = %config.build.build_number,
        state = %config.build.state,
        lines = message.len(),
        targets = config.irc.channels.len(),
        "Sending notification"
    );

    let report = Dispatcher::new()
        .deliver(&message, &config.irc.channels, &config.client_config())
        .await;

    // Delivery failures are already logged per target; they never fail the run.
    if !report.is_complete() {
        warn!(
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "Some targets were not notified"
        );
    }

    Ok(())
}
