//! Classhub CLI - schedule and manage live classroom sessions.
//!
//! Architecture:
//! - CLI is a thin client over the `classhub` library
//! - All data lives in the school backend, reached over HTTP
//! - `classhub serve` runs an in-memory backend for local use

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
