mod args;
mod output;

use clap::Parser;
use launch_core::{LaunchLocator, RetryPolicy, TimestampOutcome};
use launch_rpc::{HeliusClient, HeliusConfig};
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // The credential is read from the environment exactly once, here at the
    // process boundary, and handed to the client as plain configuration. An
    // absent key yields an empty credential that fails upstream.
    let api_key = std::env::var("HELIUS_API_KEY").unwrap_or_default();
    let client = HeliusClient::new(HeliusConfig::new(api_key));
    let locator = LaunchLocator::new(client).with_retry_policy(RetryPolicy {
        verbose: cli.verbose,
        ..RetryPolicy::default()
    });

    info!(address = %cli.address, "looking up first deployment");
    match locator.first_deployment_timestamp(&cli.address).await {
        TimestampOutcome::Found(timestamp) => {
            println!("{}", output::render_payload(timestamp, OffsetDateTime::now_utc())?);
            Ok(())
        }
        TimestampOutcome::MissingBlockTime => {
            eprintln!("Oldest record carries no block time");
            std::process::exit(1);
        }
        TimestampOutcome::Unavailable => {
            eprintln!("Deployment timestamp not found");
            std::process::exit(1);
        }
    }
}
