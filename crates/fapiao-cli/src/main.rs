//! CLI application for invoice ingestion and record management.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ingest, list, serve, status};

/// Invoice ingestion - extract structured data from scanned invoices
#[derive(Parser)]
#[command(name = "fapiao")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest invoice files as one batch
    Ingest(ingest::IngestArgs),

    /// List stored invoice records
    List(list::ListArgs),

    /// Update the status of a stored record
    Status(status::StatusArgs),

    /// Serve the record store over HTTP
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Ingest(args) => ingest::run(args, cli.config.as_deref()).await,
        Commands::List(args) => list::run(args, cli.config.as_deref()).await,
        Commands::Status(args) => status::run(args, cli.config.as_deref()).await,
        Commands::Serve(args) => serve::run(args, cli.config.as_deref()).await,
    }
}
