//! `taskdeck` command-line client.

use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use taskdeck::cli::{self, Cli};
use taskdeck::{Config, SyncController, TodoEnvironment};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,taskdeck=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter = match cli.log_filter.as_deref() {
        Some(directive) => tracing_subscriber::EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log directive {directive:?}"))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(output) = cli::render_offline(&cli.command) {
        println!("{output}");
        return Ok(());
    }

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        base_id = %config.base_id,
        table = %config.table_name,
        "Configuration loaded"
    );

    let controller = SyncController::new(
        config.client()?,
        TodoEnvironment::new(config.search_debounce),
    );

    let output = cli::execute(cli.command, &controller).await?;
    println!("{output}");

    controller.shutdown(Duration::from_secs(2)).await?;
    Ok(())
}
