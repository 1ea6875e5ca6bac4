//! PostGate CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Create the config directory and default config
//! - `configure`: Save the instruction prompt and API key
//! - `check`: Evaluate one draft and print the verdict
//! - `compose`: Interactive composer with the gate in front of "post"
//! - `doctor`: Diagnose configuration and settings

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "postgate",
    about = "PostGate — AI review before your post goes out",
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
    /// Initialize the configuration directory
    Onboard,

    /// Save the instruction prompt and OpenAI API key
    Configure {
        /// What the reviewer should block
        #[arg(short, long)]
        prompt: String,

        /// OpenAI API key
        #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// Evaluate a single draft
    Check {
        /// The draft text
        text: String,
    },

    /// Write posts in the terminal with the gate in front of "post"
    Compose,

    /// Diagnose configuration and settings
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

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
        Commands::Configure { prompt, api_key } => {
            commands::configure::run(prompt, api_key).await?
        }
        Commands::Check { text } => commands::check::run(text).await?,
        Commands::Compose => commands::compose::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
