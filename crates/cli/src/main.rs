//! Ragline CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive or single-message retrieval-grounded chat
//! - `status` — Show configuration and provider availability

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragline",
    about = "Ragline — retrieval-grounded chat over your documents",
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
    /// Chat with retrieval over session-loaded documents
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Text or markdown files to load into the session knowledge base
        #[arg(short, long = "ingest", value_name = "FILE")]
        ingest: Vec<String>,

        /// Persona instructions appended to every system prompt
        #[arg(short, long)]
        persona: Option<String>,

        /// Also query the configured comparison model each turn
        #[arg(short, long)]
        compare: bool,
    },

    /// Show configuration and which providers are available
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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

    match cli.command {
        Commands::Chat {
            message,
            ingest,
            persona,
            compare,
        } => commands::chat::run(message, ingest, persona, compare).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
