//! Binary crate for the `weather` command.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The single-window terminal UI and plain-text output

use clap::Parser;

mod app;
mod cli;
mod logging;
mod output;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
