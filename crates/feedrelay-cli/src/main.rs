use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Debug, Parser)]
#[command(name = "feedrelay")]
#[command(about = "Relay new RSS/Atom entries to Telegram channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// One full sweep over all configured feeds (the default).
    Run,
    /// Load the config and mapping store and report each row's watermark
    /// without fetching or sending anything.
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = feedrelay_core::load_app_config_from_env().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = run::sweep(&config).await?;
            tracing::info!(
                feeds_processed = report.feeds_processed,
                feeds_failed = report.feeds_failed,
                entries_delivered = report.entries_delivered,
                entries_failed = report.entries_failed,
                watermarks_advanced = report.watermarks_advanced,
                "sweep finished"
            );
        }
        Commands::Validate => run::validate(&config)?,
    }

    Ok(())
}
