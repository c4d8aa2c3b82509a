mod auth;
mod cli;
mod config;
mod error;
mod git;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if console::Term::stderr().is_term() {
        output::print_banner();
    }

    info!("Starting glci");
    cli.execute().await?;

    Ok(())
}
