//! Configuration tests: command-line flags and their environment fallbacks

mod common;

use ccteam::{
    CcteamError,
    cli::{Cli, Command},
    provider_admin::AdminClient,
};
use clap::Parser;
use common::{ENV_MUTEX, EnvVarGuard};
use std::time::Duration;

const CONFIG_VARS: [&str; 6] = [
    "ANTHROPIC_ADMIN_API_KEY",
    "POLL_INTERVAL_MS",
    "ALL_TIME_DAYS",
    "PORT",
    "ANTHROPIC_API_BASE",
    "CCTEAM_REQUEST_TIMEOUT_SECS",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    CONFIG_VARS.iter().map(|key| (*key, None)).collect()
}

#[tokio::test]
async fn test_environment_configuration() {
    let _lock = ENV_MUTEX.lock().await;
    let _env = EnvVarGuard::set(&[
        ("ANTHROPIC_ADMIN_API_KEY", Some("sk-ant-admin-env")),
        ("POLL_INTERVAL_MS", Some("60000")),
        ("ALL_TIME_DAYS", Some("30")),
        ("PORT", Some("8080")),
        ("ANTHROPIC_API_BASE", Some("http://localhost:9999")),
        ("CCTEAM_REQUEST_TIMEOUT_SECS", Some("5")),
    ]);

    let cli = Cli::try_parse_from(["ccteam"]).unwrap();
    assert_eq!(cli.api_key(), "sk-ant-admin-env");
    assert_eq!(cli.poll_interval(), Duration::from_secs(60));
    assert_eq!(cli.all_time_days, 30);
    assert_eq!(cli.listen_addr().port(), 8080);
    assert_eq!(cli.api_base, "http://localhost:9999");
    assert_eq!(cli.request_timeout(), Duration::from_secs(5));
    assert_eq!(cli.command(), Command::Serve);
}

#[tokio::test]
async fn test_flags_override_environment() {
    let _lock = ENV_MUTEX.lock().await;
    let _env = EnvVarGuard::set(&[("PORT", Some("8080")), ("ALL_TIME_DAYS", Some("30"))]);

    let cli = Cli::try_parse_from(["ccteam", "--port", "4000", "serve"]).unwrap();
    assert_eq!(cli.port, 4000);
    assert_eq!(cli.all_time_days, 30);
}

#[tokio::test]
async fn test_defaults_without_environment() {
    let _lock = ENV_MUTEX.lock().await;
    let _env = EnvVarGuard::set(&cleared());

    let cli = Cli::try_parse_from(["ccteam", "snapshot"]).unwrap();
    assert_eq!(cli.poll_interval(), Duration::from_millis(300_000));
    assert_eq!(cli.all_time_days, 90);
    assert_eq!(cli.port, 3000);
    assert_eq!(cli.api_base, "https://api.anthropic.com");
    assert_eq!(cli.request_timeout(), Duration::from_secs(30));
    assert_eq!(
        cli.command(),
        Command::Snapshot {
            json: false,
            today: None
        }
    );
}

#[tokio::test]
async fn test_missing_api_key_is_rejected() {
    let _lock = ENV_MUTEX.lock().await;
    let _env = EnvVarGuard::set(&cleared());

    let cli = Cli::try_parse_from(["ccteam"]).unwrap();
    assert_eq!(cli.api_key(), "");

    let result = AdminClient::new(cli.api_key(), cli.request_timeout());
    assert!(matches!(result, Err(CcteamError::Config(_))));
}

#[tokio::test]
async fn test_invalid_numeric_environment_is_rejected() {
    let _lock = ENV_MUTEX.lock().await;
    let _env = EnvVarGuard::set(&[("POLL_INTERVAL_MS", Some("soon"))]);

    assert!(Cli::try_parse_from(["ccteam"]).is_err());
}
