//! Failures stay inside their own target or group.

mod common;

use std::time::Duration;

use common::{Behavior, MockServer, strings, test_config};
use irc_notify::{Dispatcher, NotifyError, TargetParseError};
use tokio::net::TcpListener;
use tokio::time::Instant;

#[tokio::test]
async fn malformed_target_does_not_abort_the_run() -> anyhow::Result<()> {
    let server = MockServer::start().await?;

    let report = Dispatcher::new()
        .deliver(
            &strings(&["hi"]),
            &[
                "http://irc.example.com#room".to_string(),
                server.target("room"),
                "irc.example.com".to_string(),
            ],
            &test_config(),
        )
        .await;

    assert_eq!(report.delivered, vec![server.target("room")]);
    let errors: Vec<&TargetParseError> = report.parse_failures.iter().map(|f| &f.error).collect();
    assert_eq!(
        errors,
        vec![
            &TargetParseError::UnknownScheme("http".to_string()),
            &TargetParseError::MissingChannel,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn silent_server_times_out_and_next_group_still_runs() -> anyhow::Result<()> {
    let silent = MockServer::with_behavior(Behavior {
        welcome: false,
        ..Behavior::default()
    })
    .await?;
    let healthy = MockServer::start().await?;

    let mut config = test_config();
    config.handshake_timeout = Duration::from_millis(200);

    let report = Dispatcher::new()
        .deliver(
            &strings(&["hi"]),
            &[silent.target("room"), healthy.target("room")],
            &config,
        )
        .await;

    assert_eq!(report.delivered, vec![healthy.target("room")]);
    assert_eq!(report.group_failures.len(), 1);
    let failure = &report.group_failures[0];
    assert_eq!(failure.targets, vec![silent.target("room")]);
    assert!(matches!(failure.error, NotifyError::AuthTimeout { .. }));

    // Nothing past registration reached the silent server.
    let sessions = silent.wait_for(1, |line| line.starts_with("USER")).await;
    assert!(sessions[0].iter().all(|l| !l.starts_with("JOIN")));
    Ok(())
}

#[tokio::test]
async fn refused_connection_is_reported() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let closed_port = listener.local_addr()?.port();
    drop(listener);
    let healthy = MockServer::start().await?;
    let refused = format!("127.0.0.1:{}#room", closed_port);

    let report = Dispatcher::new()
        .deliver(
            &strings(&["hi"]),
            &[refused.clone(), healthy.target("room")],
            &test_config(),
        )
        .await;

    assert_eq!(report.delivered, vec![healthy.target("room")]);
    let failure = &report.group_failures[0];
    assert_eq!(failure.targets, vec![refused]);
    assert!(matches!(
        failure.error,
        NotifyError::Connect { port, .. } if port == closed_port
    ));
    assert_eq!(failure.error.error_code(), "connect_error");
    Ok(())
}

#[tokio::test]
async fn server_that_never_hangs_up_after_quit() -> anyhow::Result<()> {
    let server = MockServer::with_behavior(Behavior {
        linger_after_quit: true,
        ..Behavior::default()
    })
    .await?;

    let started = Instant::now();
    let report = Dispatcher::new()
        .deliver(&strings(&["hi"]), &[server.target("room")], &test_config())
        .await;

    assert!(report.is_complete());
    assert!(started.elapsed() < Duration::from_secs(3));
    let sessions = server.wait_for(1, |line| line == "QUIT").await;
    assert_eq!(sessions[0].last().map(String::as_str), Some("QUIT"));
    Ok(())
}

#[tokio::test]
async fn empty_target_list_is_a_no_op() {
    let report = Dispatcher::new()
        .deliver(&strings(&["hi"]), &[], &test_config())
        .await;
    assert!(report.is_complete());
    assert_eq!(report.delivered_count(), 0);
}
