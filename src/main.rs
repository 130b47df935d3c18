use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod keywords;
mod llm;
mod pipeline;
mod publisher;
mod util;

#[derive(Parser)]
#[command(name = "autopost", version)]
#[command(about = "Generate keyword-driven articles with an LLM and publish them to WordPress", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch generation pipeline
    Run {
        /// Config file path (defaults to ./config.yaml, then the user config dir)
        config: Option<String>,

        /// Keyword file path (overrides keywords_path from the config)
        #[arg(short, long)]
        keywords: Option<String>,

        /// Use the mock LLM client and make no outbound API calls
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            keywords,
            dry_run,
            yes,
        } => {
            cli::run::run(config, keywords, dry_run, yes).await?;
        }
    }

    Ok(())
}

/// Log to stdout and append to logs/autopost.log. The returned guard must
/// stay alive for the process lifetime so buffered lines are flushed.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all("logs")?;
    let file_appender = tracing_appender::rolling::never("logs", "autopost.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}
