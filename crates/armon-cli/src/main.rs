// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use armon_cli::commands;
use armon_cli::config::CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "armon")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Folder-convention API stores with generated JavaScript clients", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Quiet mode: no status output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve stores with live rebuilds and client regeneration
    Dev {
        /// Port to run the server on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (overrides the config)
        #[arg(long)]
        host: Option<String>,
    },
    /// Generate client modules once and exit
    Generate,
    /// Print the discovered route table
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Dev { port, host } => {
            commands::dev::run(&cli.config, host, port, cli.quiet).await
        }
        Commands::Generate => commands::generate::run(&cli.config, cli.quiet),
        Commands::Routes { json } => commands::routes::run(&cli.config, json),
    }
}
