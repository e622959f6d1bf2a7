use crate::config::Cli;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod domain;
mod errors;
mod monitor;
mod notifier;
mod scraper;
mod store;

#[cfg(test)]
mod tests;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 1️⃣ Logging, overridable through RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting shop monitor with {}", cli.config.display());

    // 2️⃣ Poll until killed (or one cycle with --once)
    match monitor::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}
