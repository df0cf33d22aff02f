//! Searoute Gateway
//!
//! Runs as a supervisor by default, re-executing itself once per worker slot
//! with the hidden `worker` subcommand. Every process uses a single-threaded
//! runtime; concurrency comes from the worker pool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use searoute_gateway::config::resolve_config;
use searoute_gateway::lifecycle::startup::{run_supervisor, run_worker};
use searoute_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "searoute-gateway", version)]
#[command(about = "HTTP gateway for maritime route computation", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the supervisor and its worker pool (default)
    Serve {
        /// Number of worker processes (defaults to available cores)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Listening port (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one worker in this process, without supervision
    Single {
        /// Listening port (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run as a supervised worker
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        slot: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = resolve_config(cli.config.as_deref())?;

    logging::init(&config.observability);

    let command = cli.command.unwrap_or(Commands::Serve {
        workers: None,
        port: None,
    });

    match command {
        Commands::Serve { workers, port } => {
            if workers.is_some() {
                config.workers.count = workers;
            }
            if let Some(port) = port {
                config.listener.port = port;
            }
            run_supervisor(config, cli.config.as_deref()).await
        }
        Commands::Single { port } => {
            if let Some(port) = port {
                config.listener.port = port;
            }
            run_worker(config, 0).await
        }
        Commands::Worker { slot } => run_worker(config, slot).await,
    }
}
