//! Property listing command

use anyhow::Result;
use colored::*;

use crate::api::constants::STANDARD_OBJECT_TYPES;
use crate::api::{metadata, HubSpotClient};
use crate::cli::PropertiesArgs;
use crate::config::Config;

pub async fn handle(args: PropertiesArgs, config: &Config) -> Result<()> {
    config.settings.require_credentials()?;
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;

    if !STANDARD_OBJECT_TYPES.contains(&args.object_type.as_str()) {
        println!(
            "{}",
            format!(
                "'{}' is not a standard object type; treating it as a custom object API name",
                args.object_type
            )
            .dimmed()
        );
    }

    let names = metadata::property_names(&client, &config.store, &args.object_type).await?;
    println!(
        "{} properties on {}",
        names.len().to_string().bold(),
        args.object_type.bold()
    );
    for name in names {
        println!("  {name}");
    }
    Ok(())
}
