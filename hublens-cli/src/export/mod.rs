//! Result export to CSV and JSON files

use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use csv::{QuoteStyle, WriterBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::api::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Serialize records to CSV.
///
/// The header is `ID` followed by the union of all property keys across the
/// records, in first-seen order. Values are always quoted with internal
/// quotes doubled; missing values render as empty strings.
pub fn to_csv(records: &[Record]) -> Result<String> {
    let columns = property_columns(records);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("ID".to_string());
    header.extend(columns.iter().cloned());
    writer.write_record(&header).context("Failed to write the CSV header")?;

    for record in records {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(record.record_id().unwrap_or_default());
        for column in &columns {
            row.push(record.property_text(column));
        }
        writer.write_record(&row).context("Failed to write a CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush the CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Serialize records as pretty-printed JSON (2-space indent)
pub fn to_json(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize results to JSON")
}

/// Union of property keys across all records, in first-seen order
fn property_columns(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.properties.keys() {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Write an export file with a timestamped name.
///
/// `output` may name a target file directly or a directory to place the
/// default `hubspot-query-results-<timestamp>.<ext>` file in; omitted, the
/// file lands in the current directory.
pub fn write_export(
    records: &[Record],
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let content = match format {
        ExportFormat::Csv => to_csv(records)?,
        ExportFormat::Json => to_json(records)?,
    };

    let default_name = format!(
        "hubspot-query-results-{}.{}",
        Local::now().format("%Y%m%d-%H%M%S"),
        format.extension()
    );
    let path = match output {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_name),
    };

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_csv_roundtrip() {
        let records = vec![
            record(json!({"id": "1", "properties": {"a": "x", "b": "y"}})),
            record(json!({"id": "2", "properties": {"a": "z", "b": ""}})),
        ];

        let csv_text = to_csv(&records).unwrap();

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["ID", "a", "b"]);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["1", "x", "y"]);
        assert_eq!(rows[1], vec!["2", "z", ""]);
    }

    #[test]
    fn test_csv_quotes_are_doubled() {
        let records = vec![record(json!({
            "id": "1",
            "properties": {"note": "she said \"hi\", twice"}
        }))];

        let csv_text = to_csv(&records).unwrap();
        assert!(csv_text.contains(r#""she said ""hi"", twice""#));

        // and it parses back to the original value
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "she said \"hi\", twice");
    }

    #[test]
    fn test_csv_header_union_first_seen_order() {
        let records = vec![
            record(json!({"id": "1", "properties": {"a": "1"}})),
            record(json!({"id": "2", "properties": {"c": "3", "b": "2"}})),
            record(json!({"id": "3", "properties": {"a": "1", "d": "4"}})),
        ];

        let csv_text = to_csv(&records).unwrap();
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["ID", "a", "c", "b", "d"]);

        // records missing a column render it as empty
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows[0], vec!["1", "1", "", "", ""]);
    }

    #[test]
    fn test_csv_id_fallback() {
        let records = vec![record(json!({
            "properties": {"hs_object_id": "777", "a": "x"}
        }))];
        let csv_text = to_csv(&records).unwrap();
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "777");
    }

    #[test]
    fn test_json_is_pretty_with_two_space_indent() {
        let records = vec![record(json!({"id": "1", "properties": {"a": "x"}}))];
        let text = to_json(&records).unwrap();
        assert!(text.starts_with("[\n  {"));

        let parsed: Vec<Record> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].record_id().as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(to_csv(&[]).unwrap(), "\"ID\"\n");
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }
}
