//! Argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Traffic shifting for versioned service stacks over weighted DNS
/// records.
#[derive(Debug, Parser)]
#[command(name = "switchyard", version, about)]
pub struct Cli {
    /// Path to the JSON state file holding zones, records, and stack
    /// versions.
    #[arg(long, global = true, default_value = "switchyard.json")]
    pub state: PathBuf,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show or change the traffic weights of a stack's versions.
    Traffic {
        /// Stack name.
        stack: String,

        /// Version label selecting the shift target. Without it the
        /// current weights of every version are printed.
        version: Option<String>,

        /// Requested traffic percentage, 0 to 100 in 0.5 steps. Without
        /// it the current weights are printed and nothing changes.
        percentage: Option<f64>,
    },
}
