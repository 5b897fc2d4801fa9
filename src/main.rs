//! ccteam - Live team dashboard feed for Claude Code usage

use ccteam::{
    cli::{Cli, Command, parse_day},
    error::Result,
    output::get_formatter,
    poller::Poller,
    provider_admin::AdminClient,
    server::{self, Broadcaster, ServerState},
    snapshot::SnapshotBuilder,
};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the snapshot builder from CLI configuration
fn create_builder(cli: &Cli) -> Result<SnapshotBuilder> {
    let client =
        AdminClient::new(cli.api_key(), cli.request_timeout())?.with_api_base(&cli.api_base);
    Ok(SnapshotBuilder::new(Arc::new(client)).with_all_time_days(cli.all_time_days))
}

async fn run_server(cli: &Cli, builder: SnapshotBuilder) -> Result<()> {
    let broadcaster = Broadcaster::default();
    let fanout = broadcaster.clone();
    let poller = Arc::new(
        Poller::new(builder, cli.poll_interval()).with_on_publish(move |snapshot| {
            fanout.publish(snapshot);
        }),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Keep serving; the sender must outlive the receivers
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let poll_task = tokio::spawn(
        Arc::clone(&poller).run_until(server::wait_for_shutdown(shutdown_rx.clone())),
    );

    let state =
        ServerState::new(poller.handle(), broadcaster).with_shutdown(shutdown_rx.clone());
    let result = server::serve(
        server::router(state),
        cli.listen_addr(),
        server::wait_for_shutdown(shutdown_rx),
    )
    .await;

    poll_task.abort();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "ccteam=info,ccteam_core=info,ccteam_provider_admin=info",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let builder = create_builder(&cli)?;

    match cli.command() {
        Command::Serve => {
            info!("Starting team usage feed");
            run_server(&cli, builder).await?;
        }
        Command::Snapshot { json, today } => {
            let snapshot = match today.as_deref() {
                Some(day) => builder.build_for(parse_day(day)?).await?,
                None => builder.build().await?,
            };
            println!("{}", get_formatter(json).format_snapshot(&snapshot));
        }
    }

    Ok(())
}
