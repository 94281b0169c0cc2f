//! mneme command-line interface.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mneme")]
#[command(version, about = "Time-stamped memory records for AI assistants")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Config file (default: ~/.mneme/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,

        /// Emit logs as JSON lines
        #[arg(long)]
        log_json: bool,
    },

    /// Validate configuration and inspect the KV store
    Check {
        /// Config file (default: ~/.mneme/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            log_json,
        } => commands::serve::execute(config.as_deref(), port, log_json).await,
        Command::Check { config } => commands::check::execute(config.as_deref()).await,
    }
}
