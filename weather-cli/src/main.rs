//! Binary crate for the `weather-matrix` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Driving the station loop with a terminal preview

use clap::Parser;
use env_logger::Env;

mod cli;
mod terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cmd.log_level()))
        .format_timestamp_secs()
        .init();

    cmd.run().await
}
