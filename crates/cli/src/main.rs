//! Emberchat CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive chat session
//! - `ask`      — Send a single message and print the reply
//! - `seal-key` — Encrypt a bearer token into the encrypted-key JSON format

use clap::{Parser, Subcommand};
use emberchat_config::AppConfig;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "emberchat",
    about = "Emberchat — retrieval-augmented chat client",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (defaults to ~/.emberchat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Encrypt a bearer token into the encrypted-key JSON format
    SealKey {
        /// The plaintext token to seal
        #[arg(short, long)]
        token: String,

        /// Output path (prints to stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { message } => commands::ask::run(config, &message).await?,
        Commands::SealKey { token, out } => commands::seal_key::run(&token, out.as_deref())?,
    }

    Ok(())
}
