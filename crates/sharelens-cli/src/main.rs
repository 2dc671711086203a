//! # Sharelens CLI
//!
//! HTTP server and command-line interface for the Sharelens file-share
//! browser.
//!
//! ## Commands
//!
//! - `sharelens serve` - Run the HTTP API
//! - `sharelens search <query>` - Search every shared root by name and tag
//! - `sharelens indexed <query>` - Search through the OS file index
//! - `sharelens list <path>` - List one directory
//! - `sharelens roots` - Show the configured shared roots
//!
//! ## Example Usage
//!
//! ```bash
//! # Serve on the configured address
//! sharelens serve
//!
//! # Find every file named or tagged like "invoice"
//! sharelens search invoice --output json
//! ```

mod app;
mod commands;
mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sharelens - browse and search shared network drives
#[derive(Parser)]
#[command(name = "sharelens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "SHARELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides the configuration)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Search every shared root for files named or tagged like the query
    Search {
        /// Text to look for (at least two characters)
        query: String,

        /// Maximum number of results to show
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Search through the operating system's file index
    Indexed {
        /// Text to look for (at least two characters)
        query: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// List the files and folders of one directory
    #[command(alias = "ls")]
    List {
        /// Directory to list
        path: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the configured shared roots and whether they are reachable
    Roots,
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => sharelens_core::Config::load_from(path)?,
        None => sharelens_core::Config::load()?,
    };

    // Setup logging
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.general.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { bind } => commands::serve::run(config, bind),
        Commands::Search {
            query,
            limit,
            output,
        } => commands::search::run(config, &query, limit, output),
        Commands::Indexed { query, output } => commands::indexed::run(config, &query, output),
        Commands::List { path, output } => commands::list::run(config, &path, output),
        Commands::Roots => commands::roots::run(config),
    }
}
