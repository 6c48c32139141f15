//! Command handlers

pub mod auth;
pub mod links;
pub mod properties;
pub mod queries;
pub mod query;
pub mod record;

use anyhow::Result;

use crate::cli::Commands;
use crate::config::Config;

pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Auth(cmd) => auth::handle(cmd, config).await,
        Commands::Query(args) => query::handle(args, config).await,
        Commands::Queries(cmd) => queries::handle(cmd, config).await,
        Commands::Links(cmd) => links::handle(cmd, config).await,
        Commands::Properties(args) => properties::handle(args, config).await,
        Commands::Record(args) => record::handle(args, config).await,
    }
}
