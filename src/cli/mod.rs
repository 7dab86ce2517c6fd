pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Poll a content provider and print fully resolved articles", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/quire/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the provider base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Number of items resolved concurrently
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(workers) = self.workers {
            config.daemon.workers = workers;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the catalog forever with a fixed delay between cycles
    Run {
        /// Delay between cycles (e.g., "300", "5m", "1h"); defaults to the config value
        #[arg(short, long)]
        delay: Option<String>,

        /// Wait one delay before the first cycle
        #[arg(long)]
        no_initial_run: bool,
    },
    /// Run a single cycle and exit
    Once,
    /// Resolve and print one item
    Show {
        /// Item id as listed in the catalog
        id: String,
    },
}
