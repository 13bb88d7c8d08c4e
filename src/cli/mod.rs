pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "headline-sync")]
#[command(about = "Keeps a paged, pinnable headline feed in sync with a news provider", long_about = None)]
pub struct Cli {
    /// Keep the snapshot in memory instead of the SQLite cache
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Path to a config file (default: ~/.config/headline-sync/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tick once and print the visible headlines
    Show {
        /// Articles to merge (default: the configured initial batch)
        #[arg(short, long)]
        batch: Option<usize>,
    },
    /// Discard the cached snapshot and fetch a new one
    Refresh,
    /// Remove the cached snapshot
    Clear,
    /// Tick on an interval and print the list after every change
    Watch {
        /// Tick interval (e.g., "5s", "1m"); defaults to the configured interval
        #[arg(short, long)]
        interval: Option<String>,
    },
}
