//! quizgen CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod view;

#[derive(Parser)]
#[command(
    name = "quizgen",
    version,
    about = "LLM-generated multiple choice quizzes for medical study"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive quiz
    Play {
        /// Subject name (skips the setup screen together with --sub-topic)
        #[arg(long, requires = "sub_topic")]
        subject: Option<String>,

        /// Sub-topic name within the subject
        #[arg(long, requires = "subject")]
        sub_topic: Option<String>,

        /// Seconds per question, 0 for untimed
        #[arg(long)]
        time_limit: Option<u32>,

        /// Number of questions, 0 for unlimited
        #[arg(long)]
        questions: Option<u32>,

        /// Provider name from the config (defaults to `default_provider`)
        #[arg(long)]
        provider: Option<String>,

        /// Model to use (defaults to `default_model`)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Topic catalog TOML replacing the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Write a transcript of each finished quiz (JSON, or markdown for `.md` paths)
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// List subjects and sub-topics
    Topics {
        /// Topic catalog TOML replacing the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Validate a topic catalog file
    Validate {
        /// Path to the catalog TOML
        #[arg(long)]
        catalog: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and an example topic catalog
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizgen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            subject,
            sub_topic,
            time_limit,
            questions,
            provider,
            model,
            config,
            catalog,
            transcript,
        } => {
            let options = commands::play::PlayOptions {
                topic: subject.zip(sub_topic),
                time_limit,
                questions,
                provider,
                model,
                config,
                catalog,
                transcript,
            };
            commands::play::execute(options).await
        }
        Commands::Topics { catalog } => commands::topics::execute(catalog),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
