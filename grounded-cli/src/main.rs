//! grounded CLI — trigger a search indexer run, then answer one question
//! grounded on the index.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use grounded_core::{ChatClient, IndexerClient};

/// grounded: ask a question answered from your own search index
#[derive(Parser, Debug)]
#[command(name = "grounded", version, about, long_about = None)]
struct Cli {
    /// Question to ask (prompts interactively if omitted)
    question: Option<String>,

    /// Print citation/context metadata alongside the answer
    #[arg(long)]
    citations: bool,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: commands::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "grounded", "grounded")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "grounded.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Handle subcommands
    if let Some(command) = cli.command {
        return match command {
            Commands::Config { action } => commands::handle_config(action, &workspace),
        };
    }

    // Load configuration; every required value must be present before any
    // network call happens.
    let mut config = grounded_core::config::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if cli.citations {
        config.show_citations = true;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let indexer = IndexerClient::new(&config.indexer)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let chat = ChatClient::new(&config.openai, &config.search)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Step 1: trigger the indexer run. Failure is reported but never stops
    // the question from being asked.
    match indexer.trigger().await {
        Ok(()) => println!("Indexer run triggered successfully."),
        Err(e) => {
            tracing::warn!(error = %e, "Indexer trigger failed");
            eprintln!("Failed to trigger indexer: {}", e);
        }
    }

    // Step 2: one question, one grounded answer.
    let question = match cli.question {
        Some(q) => q,
        None => prompt_question().await?,
    };
    if question.trim().is_empty() {
        anyhow::bail!("Question must not be empty");
    }

    let answer = chat.ask(question.trim()).await?;
    println!("{}", answer.render(config.show_citations));

    Ok(())
}

/// Prompt for a question and read one line from stdin.
async fn prompt_question() -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"\nEnter a question:\n").await?;
    stdout.flush().await?;

    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    reader.read_line(&mut line).await?;
    Ok(line)
}
