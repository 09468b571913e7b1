//! Switchyard
//!
//! Traffic shifting for versioned service stacks: recompute weighted DNS
//! routing weights so that total weight is conserved, disabled versions
//! stay disabled, and live versions never starve below the minimum floor
//! unless explicitly switched off.

use clap::Parser;
use switchyard_cli::cli::{Cli, Commands};
use switchyard_cli::commands;
use switchyard_cli::store::JsonStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let store = JsonStore::open(&cli.state)?;

    match cli.command {
        Commands::Traffic {
            stack,
            version,
            percentage,
        } => {
            commands::traffic::execute(&store, &stack, version.as_deref(), percentage).await?;
        }
    }

    Ok(())
}
