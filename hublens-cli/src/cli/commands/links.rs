//! Quick-link bookmark commands

use anyhow::Result;
use colored::*;

use crate::cli::LinksCommands;
use crate::config::Config;

pub async fn handle(command: LinksCommands, config: &Config) -> Result<()> {
    match command {
        LinksCommands::List => {
            let links = config.store.quick_links().await?;
            if links.is_empty() {
                println!("{}", "No quick links".dimmed());
                return Ok(());
            }
            for (slot, link) in links.iter().enumerate() {
                println!(
                    "  {} {} {} {} {}",
                    slot.to_string().dimmed(),
                    link.icon,
                    link.name.bold(),
                    link.url.cyan(),
                    link.id.dimmed(),
                );
                if !link.description.is_empty() {
                    println!("      {}", link.description.dimmed());
                }
            }
            Ok(())
        }
        LinksCommands::Add {
            name,
            url,
            icon,
            description,
            color,
        } => {
            let link = config
                .store
                .add_quick_link(&name, &url, &icon, &description, &color)
                .await?;
            println!("Added {} ({})", link.name.bold(), link.id.dimmed());
            Ok(())
        }
        LinksCommands::Remove { id } => {
            config.store.remove_quick_link(&id).await?;
            println!("Removed quick link {}", id.dimmed());
            Ok(())
        }
        LinksCommands::Move { from, to } => {
            config.store.move_quick_link(from, to).await?;
            println!("Moved slot {from} to slot {to}");
            Ok(())
        }
    }
}
