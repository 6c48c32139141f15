//! Query command handler and shared execution/rendering helpers

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use std::path::Path;

use crate::api::query::{Filter, FilterOperator, QueryBuilder, QueryDescriptor};
use crate::api::{HubSpotClient, QueryResult, Record};
use crate::cli::QueryArgs;
use crate::config::Config;
use crate::export::{self, ExportFormat};

/// Records above this count prompt for confirmation before export
const BULK_EXPORT_WARNING_THRESHOLD: usize = 1000;

pub async fn handle(args: QueryArgs, config: &Config) -> Result<()> {
    let descriptor = build_descriptor(
        &args.object_type,
        args.properties,
        &args.filters,
        args.limit,
    )?;

    if let Some(name) = &args.save {
        let entry = config.store.save_query(&descriptor, name).await?;
        println!("Saved as {} ({})", entry.name.bold(), entry.id.dimmed());
    }

    execute_and_render(
        config,
        &descriptor,
        args.export,
        args.output.as_deref(),
        args.yes,
    )
    .await
}

/// Build a descriptor from CLI arguments. All `--filter` flags AND into a
/// single group, the same shape the drawer UI produced.
pub fn build_descriptor(
    object_type: &str,
    properties: Vec<String>,
    filter_args: &[String],
    limit: Option<u32>,
) -> Result<QueryDescriptor> {
    let mut builder = QueryBuilder::new(object_type).properties(properties);
    for raw in filter_args {
        let filter = parse_filter_arg(raw)?;
        builder = builder.filter(filter.property_name, filter.operator, filter.value);
    }
    if let Some(limit) = limit {
        builder = builder.limit(limit);
    }
    builder.build()
}

/// Parse one PROP:OP[:VALUE] filter argument
pub fn parse_filter_arg(raw: &str) -> Result<Filter> {
    let mut parts = raw.splitn(3, ':');
    let property = parts
        .next()
        .filter(|p| !p.is_empty())
        .with_context(|| format!("filter '{raw}' is missing a property name"))?;
    let operator: FilterOperator = parts
        .next()
        .with_context(|| format!("filter '{raw}' is missing an operator (PROP:OP[:VALUE])"))?
        .parse()?;
    let value = parts.next().map(String::from);

    if operator.takes_value() && value.is_none() {
        anyhow::bail!("filter operator '{operator}' requires a value (PROP:OP:VALUE)");
    }
    Ok(Filter::new(property, operator, value))
}

/// Execute a descriptor, capture it in the recent list, render a table, and
/// optionally export the results.
pub async fn execute_and_render(
    config: &Config,
    descriptor: &QueryDescriptor,
    export_format: Option<ExportFormat>,
    output: Option<&Path>,
    skip_confirm: bool,
) -> Result<()> {
    config.settings.require_credentials()?;
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;

    let result = client.execute_query(descriptor).await?;
    config.store.save_to_recent(descriptor).await?;

    print_summary(descriptor, &result);
    print_table(&result.records, &descriptor.properties);

    if let Some(format) = export_format {
        if result.is_empty() {
            println!("No results to export");
            return Ok(());
        }
        if result.len() > BULK_EXPORT_WARNING_THRESHOLD && !skip_confirm {
            let proceed = Confirm::new()
                .with_prompt(format!("Export all {} records?", result.len()))
                .default(false)
                .interact()
                .context("Failed to read the confirmation")?;
            if !proceed {
                println!("Export skipped");
                return Ok(());
            }
        }
        let path = export::write_export(&result.records, format, output)?;
        println!("Results written to {}", path.display().to_string().bright_green());
    }
    Ok(())
}

fn print_summary(descriptor: &QueryDescriptor, result: &QueryResult) {
    println!(
        "{} {} record(s) from {} in {} batch(es)",
        "Fetched".bright_green().bold(),
        result.len(),
        descriptor.object_type.bold(),
        result.batches
    );
}

const MAX_CELL_WIDTH: usize = 40;

fn cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        truncated.push('…');
        truncated
    }
}

/// Render records as a fixed-width table: ID column plus the selected
/// properties in their descriptor order
fn print_table(records: &[Record], properties: &[String]) {
    if records.is_empty() {
        println!("{}", "No results".dimmed());
        return;
    }

    let mut header = vec!["ID".to_string()];
    header.extend(properties.iter().cloned());

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![cell(&record.record_id().unwrap_or_default())];
            row.extend(properties.iter().map(|p| cell(&record.property_text(p))));
            row
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain([h.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |row: &[String]| {
        row.iter()
            .zip(widths.iter().copied())
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!();
    println!("{}", line(&header).bold());
    for row in &rows {
        println!("{}", line(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_with_value() {
        let filter = parse_filter_arg("email:contains:@acme.com").unwrap();
        assert_eq!(filter.property_name, "email");
        assert_eq!(filter.operator, FilterOperator::Contains);
        assert_eq!(filter.value.as_deref(), Some("@acme.com"));
    }

    #[test]
    fn test_parse_filter_value_may_contain_colons() {
        let filter = parse_filter_arg("website:eq:https://acme.com").unwrap();
        assert_eq!(filter.value.as_deref(), Some("https://acme.com"));
    }

    #[test]
    fn test_parse_existence_filter_without_value() {
        let filter = parse_filter_arg("phone:is_known").unwrap();
        assert_eq!(filter.operator, FilterOperator::IsKnown);
        assert_eq!(filter.value, None);
    }

    #[test]
    fn test_parse_filter_errors() {
        assert!(parse_filter_arg("email").is_err());
        assert!(parse_filter_arg("email:like:x").is_err());
        // comparison operators need a value
        assert!(parse_filter_arg("email:eq").is_err());
        assert!(parse_filter_arg(":eq:x").is_err());
    }

    #[test]
    fn test_build_descriptor_groups_filters() {
        let descriptor = build_descriptor(
            "contacts",
            vec!["email".into()],
            &["email:is_known".into(), "email:contains:@acme.com".into()],
            Some(50),
        )
        .unwrap();

        assert_eq!(descriptor.filter_groups.len(), 1);
        assert_eq!(descriptor.filter_groups[0].filters.len(), 2);
        assert_eq!(descriptor.limit, Some(50));
    }

    #[test]
    fn test_cell_truncation() {
        assert_eq!(cell("short"), "short");
        let long = "x".repeat(100);
        let truncated = cell(&long);
        assert_eq!(truncated.chars().count(), MAX_CELL_WIDTH);
        assert!(truncated.ends_with('…'));
    }
}
