//! neuromaster CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use neuromaster_core::model::GameMode;

mod commands;

#[derive(Parser)]
#[command(name = "neuromaster", version, about = "Cranial nerve quiz trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the per-mode stats files
    #[arg(long, global = true)]
    stats_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cranial nerve reference table
    Reference {
        /// Show a single nerve by number (1-12)
        #[arg(long)]
        id: Option<u8>,
    },

    /// Pick the twelve nerves in order against the clock
    Order,

    /// Identify the nerve behind generated clinical cases
    Clinical {
        /// Configured provider to generate cases with
        #[arg(long)]
        provider: Option<String>,
    },

    /// Identify the nerve shown in generated illustrations
    Visual {
        /// Configured provider to generate illustrations with
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show best, last and history per game mode
    Stats {
        /// Restrict to one mode: ordering, clinical, visual
        #[arg(long)]
        mode: Option<GameMode>,

        /// Also write an HTML progress report to this path
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("neuromaster=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let stats_dir = cli.stats_dir;

    let result = match cli.command {
        Commands::Reference { id } => commands::reference::execute(id),
        Commands::Order => commands::order::execute(config, stats_dir).await,
        Commands::Clinical { provider } => {
            commands::quiz::execute(GameMode::Clinical, provider, config, stats_dir).await
        }
        Commands::Visual { provider } => {
            commands::quiz::execute(GameMode::Visual, provider, config, stats_dir).await
        }
        Commands::Stats { mode, html } => commands::stats::execute(mode, html, config, stats_dir),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
