mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "minutes",
    about = "Meeting-minutes action board — serve the API and work the board from a terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the board API server
    Serve {
        /// Config file path
        #[arg(long, default_value = "minutes.yaml")]
        config: PathBuf,
    },

    /// Print the board, grouped by column
    Board {
        /// API base URL
        #[arg(long, env = "MINUTES_URL", default_value = "http://localhost:8717")]
        url: String,

        /// Session token
        #[arg(long, env = "MINUTES_TOKEN")]
        token: String,
    },

    /// Extract action items from a meeting note and review them
    Extract {
        /// API base URL
        #[arg(long, env = "MINUTES_URL", default_value = "http://localhost:8717")]
        url: String,

        /// Session token
        #[arg(long, env = "MINUTES_TOKEN")]
        token: String,

        /// Meeting note id
        #[arg(long)]
        note: Uuid,

        /// Save every proposed item without prompting
        #[arg(long)]
        yes: bool,
    },

    /// Write a starter config file
    InitConfig {
        /// Where to write it
        #[arg(default_value = "minutes.yaml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { config } => cmd::serve::run(&config).await,
        Commands::Board { url, token } => cmd::board::run(&url, &token, cli.json).await,
        Commands::Extract {
            url,
            token,
            note,
            yes,
        } => cmd::extract::run(&url, &token, note, yes, cli.json).await,
        Commands::InitConfig { path } => cmd::init::run(&path),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
