//! CareBot CLI: the main entry point.
//!
//! Commands:
//! - `onboard`    Write a default config file
//! - `chat`       Interactive chat or single-message mode
//! - `recommend`  Suggest doctors for a list of symptoms
//! - `knowledge`  Show the facility catalog or look a doctor up
//! - `doctor`     Diagnose configuration and backend health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "carebot",
    about = "CareBot: hospital and doctor information assistant",
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
    /// Create the configuration directory and a default config.toml
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print the assembled prompt instead of calling the backend
        #[arg(long)]
        dry_run: bool,

        /// Print the single-message reply as JSON
        #[arg(long, requires = "message")]
        json: bool,
    },

    /// Suggest doctors at the configured facility for the given symptoms
    Recommend {
        /// Symptom description, e.g. "demam dan batuk"
        #[arg(required = true)]
        symptoms: Vec<String>,
    },

    /// Show the knowledge catalog
    Knowledge {
        /// Show which doctor a message would be matched to
        #[arg(short, long)]
        find: Option<String>,
    },

    /// Diagnose system health
    Doctor,
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
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            dry_run,
            json,
        } => commands::chat::run(message, dry_run, json).await?,
        Commands::Recommend { symptoms } => commands::recommend::run(symptoms.join(" ")).await?,
        Commands::Knowledge { find } => commands::knowledge::run(find).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
