//! Tutor Prompts CLI
//!
//! Entry point for the prompt catalog tool. Initializes tracing, parses CLI
//! arguments, and dispatches to the appropriate command handler.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the rendered prompt.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    cli.run()
}
