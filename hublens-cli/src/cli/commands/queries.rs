//! Saved/recent query management commands

use anyhow::Result;
use colored::*;

use super::query::{build_descriptor, execute_and_render};
use crate::api::ApiError;
use crate::cli::QueriesCommands;
use crate::config::repository::CachedQuery;
use crate::config::Config;

pub async fn handle(command: QueriesCommands, config: &Config) -> Result<()> {
    match command {
        QueriesCommands::List => list(config).await,
        QueriesCommands::Save {
            name,
            object_type,
            properties,
            filters,
            limit,
        } => {
            let descriptor = build_descriptor(&object_type, properties, &filters, limit)?;
            let entry = config.store.save_query(&descriptor, &name).await?;
            println!("Saved as {} ({})", entry.name.bold(), entry.id.dimmed());
            Ok(())
        }
        QueriesCommands::Run {
            query,
            export,
            output,
            yes,
        } => {
            let entry = resolve(config, &query).await?;
            println!("Running {} ({})", entry.name.bold(), entry.id.dimmed());
            execute_and_render(config, &entry.descriptor(), export, output.as_deref(), yes).await
        }
        QueriesCommands::Delete { id } => {
            config.store.delete_saved_query(&id).await?;
            println!("Deleted saved query {}", id.dimmed());
            Ok(())
        }
    }
}

/// Load by id; when that misses, fall back to a saved query with this exact
/// name (a CLI convenience, the cache itself is id-keyed)
async fn resolve(config: &Config, query: &str) -> Result<CachedQuery> {
    match config.store.load_query(query).await {
        Ok(entry) => Ok(entry),
        Err(err) if err.downcast_ref::<ApiError>().is_some_and(|e| matches!(e, ApiError::NotFound(_))) => {
            let by_name = config
                .store
                .saved_queries()
                .await?
                .into_iter()
                .find(|q| q.name == query);
            match by_name {
                Some(entry) => config.store.load_query(&entry.id).await,
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

async fn list(config: &Config) -> Result<()> {
    let saved = config.store.saved_queries().await?;
    let recent = config.store.recent_queries().await?;

    println!("{}", "Saved queries".bold());
    if saved.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for entry in &saved {
        print_entry(entry);
    }

    println!();
    println!("{}", "Recent queries".bold());
    if recent.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for entry in &recent {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &CachedQuery) {
    let limit = entry
        .limit
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    println!(
        "  {} {} — {} [{} properties, {} filter group(s), limit {}] run {}x, last {}",
        entry.id.dimmed(),
        entry.name.bold(),
        entry.object_type,
        entry.properties.len(),
        entry.filters.len(),
        limit,
        entry.execution_count,
        entry.last_executed.format("%Y-%m-%d %H:%M"),
    );
}
