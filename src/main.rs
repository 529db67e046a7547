mod chain;
mod cli;
mod model;
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Headless output goes to stdout, so logs go to stderr. The TUI owns the terminal and
/// only logs when given a file.
fn init_tracing(args: &cli::Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.is_headless() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else if let Some(path) = args.log_file.as_deref() {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_headless = args.is_headless();
    init_tracing(&args)?;

    match cli::run(args).await {
        Ok(true) => {
            if is_headless {
                std::process::exit(0);
            }
            Ok(())
        }
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "panel exited with error");
            Err(e)
        }
    }
}
