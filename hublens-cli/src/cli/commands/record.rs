//! Single-record inspection command

use anyhow::Result;
use colored::*;

use crate::api::HubSpotClient;
use crate::cli::RecordArgs;
use crate::config::Config;

pub async fn handle(args: RecordArgs, config: &Config) -> Result<()> {
    config.settings.require_credentials()?;
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;

    let record = client
        .fetch_record(&args.object_type, &args.id, &args.properties)
        .await?;

    println!(
        "{} {} ({})",
        args.object_type.bold(),
        record.record_id().unwrap_or_else(|| args.id.clone()).bold(),
        "1 record".dimmed()
    );
    for property in &args.properties {
        println!("  {}: {}", property.cyan(), record.property_text(property));
    }
    Ok(())
}
