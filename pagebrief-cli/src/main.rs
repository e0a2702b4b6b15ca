use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod history;

#[derive(Parser)]
#[command(name = "pagebrief", about = "Summarize web page text with hosted LLMs")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize extracted page text
    Summarize(commands::summarize::SummarizeArgs),
    /// List providers and their capabilities
    Providers(commands::providers::ProvidersArgs),
    /// Manage provider API keys
    Auth(commands::auth::AuthArgs),
    /// Show or clear recent summaries
    History(commands::history::HistoryArgs),
    /// Show configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag when set
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Summarize(args) => commands::summarize::run(args).await,
        Commands::Providers(args) => commands::providers::run(args),
        Commands::Auth(args) => commands::auth::run(args),
        Commands::History(args) => commands::history::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
