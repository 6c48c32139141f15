//! hublens-cli entry point

mod api;
mod cli;
mod config;
mod export;

use clap::Parser;
use colored::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = cli::Cli::parse();

    let result = match config::Config::load().await {
        Ok(config) => cli::commands::dispatch(args.command, &config).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
