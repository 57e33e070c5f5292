//! OpenPaw CLI — the main entry point.
//!
//! Commands:
//! - `chat`    — Interactive chat or single-message mode
//! - `history` — Show recent conversation log rows
//! - `clear`   — Wipe the conversation log
//! - `models`  — List available Gemini models

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "openpaw",
    about = "OpenPaw — a tool-using Gemini agent with human-in-the-loop approval",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show recent conversation log rows
    History {
        /// How many rows to show
        #[arg(short, long, default_value_t = 20)]
        count: u32,
    },

    /// Wipe the conversation log
    Clear,

    /// List the Gemini models available with the configured key
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::History { count } => commands::history::run(count).await?,
        Commands::Clear => commands::clear::run().await?,
        Commands::Models => commands::models::run().await?,
    }

    Ok(())
}
