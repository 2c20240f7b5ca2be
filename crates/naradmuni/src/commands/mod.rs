use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use naradmuni_core::config::get_config;
use std::path::PathBuf;

pub mod ask;
pub mod serve;

/// Naradmuni - a chat relay for the Naradmuni advisor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP relay server.
    Serve {
        /// Address to bind, overrides the configured value.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overrides the configured value.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one message and print the assistant reply.
    Ask {
        /// Message to send.
        message: Vec<String>,
        /// Model to use, must be defined in the config.
        #[arg(short, long)]
        model: Option<String>,
    },
}

fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        "naradmuni=debug,naradmuni_core=debug"
    } else {
        "naradmuni=info,naradmuni_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run_app() -> Result<()> {
    // Load a local .env, if any, before reading provider credentials
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Load configuration
    let config = get_config(cli.config.clone()).context("Failed to load configuration")?;

    match &cli.command {
        Commands::Serve { host, port } => serve::execute(host.clone(), *port, &config).await,
        Commands::Ask { message, model } => {
            ask::execute(message.clone(), model.clone(), &config).await
        }
    }
}
