//! entitlement-sync - replay order notifications against in-memory state.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use entitlement_sync::config::AppConfig;
use entitlement_sync::replay::{replay, Fixture};
use entitlement_sync::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "entitlement-sync")]
#[command(about = "Replay order notifications and print the resulting entitlements")]
struct Cli {
    /// JSON fixture with catalog, plans, orders, prior state and steps
    fixture: PathBuf,

    /// TOML configuration file; environment variables override it
    #[arg(short, long, env = "ENTITLEMENT_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.telemetry).context("Failed to initialise tracing")?;

    let raw = std::fs::read_to_string(&cli.fixture)
        .with_context(|| format!("Failed to read fixture {}", cli.fixture.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid fixture {}", cli.fixture.display()))?;

    tracing::info!(
        steps = fixture.steps.len(),
        offset = %config.reconciliation.calendar_offset(),
        "Replaying fixture"
    );
    let output = replay(fixture, &config.reconciliation).await;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}
