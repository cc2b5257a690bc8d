mod cache;
mod display;
mod extract;
mod model;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "infl")]
#[command(about = "Influencer feature extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where account activity is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// The rate-limited remote API
    Live,
    /// The archived relational store
    Store,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract and print the feature vector of one account
    Extract {
        username: String,

        #[arg(long, value_enum, default_value = "live")]
        source: SourceKind,

        /// Print the full feature record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build the comment word model from the archived corpus
    BuildModel {
        /// Rebuild even if a model artifact already exists
        #[arg(long)]
        force: bool,
    },
    /// Extract labeled archived users into the feature cache
    BuildCache {
        /// Stop after this many users from the store
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Print cached vectors as JSON lines
    Export,
    /// Score a single comment against the word model
    ScoreComment { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = infl_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, ?config, "loaded configuration");

    match cli.command {
        Commands::Extract {
            username,
            source,
            json,
        } => extract::run_extract(&config, &username, source, json).await,
        Commands::BuildModel { force } => model::run_build_model(&config, force).await,
        Commands::BuildCache { limit } => cache::run_build_cache(&config, limit).await,
        Commands::Export => cache::run_export(&config),
        Commands::ScoreComment { text } => model::run_score_comment(&config, &text).await,
    }
}
