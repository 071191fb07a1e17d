use anyhow::Result;
use clap::Parser;
use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod config;
mod responder;
mod session;
mod tui;
mod utils;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Set up panic hook for graceful error recovery
    std::panic::set_hook(Box::new(|panic_info| {
        // Leave raw mode first so the message is readable
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        error!("Application panicked: {}", panic_info);
        eprintln!("zed-ai panicked: {}", panic_info);
        std::process::exit(1);
    }));

    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Don't error if .env file doesn't exist
        tracing::debug!("No .env file found or error loading it: {}", e);
    }

    // Execute CLI command
    if let Err(e) = execute().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Install the tracing subscriber. With `log_file` set (interactive mode) log
/// lines are appended there so they don't draw over the terminal UI.
pub(crate) fn init_logging(debug: bool, log_file: Option<PathBuf>) -> Result<()> {
    let default_directive = if debug { "zed_ai=debug" } else { "zed_ai=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

async fn execute() -> Result<()> {
    let cli = Cli::parse();
    cli.execute().await
}
