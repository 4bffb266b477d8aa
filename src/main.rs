mod auth;
mod cli;
mod collector;
mod config;
mod dates;
mod error;
mod metrics;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    output::print_banner();

    let cli = Cli::parse();
    cli.execute().await?;

    Ok(())
}
