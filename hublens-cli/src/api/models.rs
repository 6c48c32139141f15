//! Wire models for the HubSpot v3 Web API
//!
//! All response-shape normalization lives here: the API sometimes returns a
//! bare array, sometimes `{results: [...]}`, and some older endpoints wrap
//! rows in `{data: [...]}`. Everything downstream sees one canonical
//! [`ResultPage`]; unrecognized shapes fail loudly instead of flowing on as
//! empty results.

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single CRM record as returned by the objects API.
///
/// `properties` is the selected property map; everything else the API sends
/// (createdAt, updatedAt, archived, associations) is kept in `extra` so JSON
/// export reproduces the record in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Record {
    /// Resolve the record id: top-level `id`, then the `hs_object_id`
    /// property, then an `id` property.
    pub fn record_id(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        for key in ["hs_object_id", "id"] {
            if let Some(value) = self.properties.get(key) {
                match value {
                    Value::String(s) => return Some(s.clone()),
                    Value::Number(n) => return Some(n.to_string()),
                    _ => {}
                }
            }
        }
        None
    }

    /// Property value rendered for display/export. Missing and null values
    /// render as the empty string; nested values as compact JSON.
    pub fn property_text(&self, name: &str) -> String {
        match self.properties.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// One page of records plus the cursor to resume from, if any
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub records: Vec<Record>,
    pub next_cursor: Option<String>,
}

impl ResultPage {
    /// Normalize a raw API response into a page.
    ///
    /// Accepts `{results, paging?}`, `{data}`, and bare arrays; anything
    /// else is an error carrying the top-level keys for diagnosis.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(rows) => Ok(Self {
                records: parse_records(rows)?,
                next_cursor: None,
            }),
            Value::Object(mut map) => {
                let next_cursor = map
                    .get("paging")
                    .and_then(|p| p.get("next"))
                    .and_then(|n| n.get("after"))
                    .and_then(Value::as_str)
                    .map(String::from);
                let rows = map.remove("results").or_else(|| map.remove("data"));
                match rows {
                    Some(Value::Array(rows)) => Ok(Self {
                        records: parse_records(rows)?,
                        next_cursor,
                    }),
                    Some(other) => anyhow::bail!(
                        "unrecognized API response shape: result container was {}",
                        type_name(&other)
                    ),
                    None => anyhow::bail!(
                        "unrecognized API response shape: expected 'results' or 'data', got keys [{}]",
                        map.keys().cloned().collect::<Vec<_>>().join(", ")
                    ),
                }
            }
            other => anyhow::bail!("unrecognized API response shape: {}", type_name(&other)),
        }
    }
}

fn parse_records(rows: Vec<Value>) -> Result<Vec<Record>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| anyhow::anyhow!("malformed record in API response: {e}")))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Property metadata from `GET /crm/v3/properties/{objectType}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
}

/// Response body of the OAuth token endpoint.
///
/// `access_token` is optional on purpose: a 2xx body without one is treated
/// as a refresh failure, not a deserialization error.
#[derive(Debug, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Response body of `GET /oauth/v1/access-tokens/{token}`
#[derive(Debug, Deserialize)]
pub struct AccessTokenInfo {
    pub hub_id: u64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_results_shape() {
        let page = ResultPage::from_value(json!({
            "results": [{"id": "1", "properties": {"email": "a@b.c"}}],
            "paging": {"next": {"after": "cursor-1"}}
        }))
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-1"));
    }

    #[test]
    fn test_normalize_data_shape() {
        let page = ResultPage::from_value(json!({"data": [{"id": "7"}]})).unwrap();
        assert_eq!(page.records.len(), 1);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_normalize_bare_array() {
        let page = ResultPage::from_value(json!([{"id": "1"}, {"id": "2"}])).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_normalize_rejects_unknown_shape() {
        let err = ResultPage::from_value(json!({"rows": []})).unwrap_err();
        assert!(err.to_string().contains("unrecognized API response shape"));
        assert!(ResultPage::from_value(json!("nope")).is_err());
    }

    #[test]
    fn test_record_id_fallbacks() {
        let with_id: Record = serde_json::from_value(json!({"id": "42"})).unwrap();
        assert_eq!(with_id.record_id().as_deref(), Some("42"));

        let numeric: Record = serde_json::from_value(json!({"id": 42})).unwrap();
        assert_eq!(numeric.record_id().as_deref(), Some("42"));

        let nested: Record =
            serde_json::from_value(json!({"properties": {"hs_object_id": "99"}})).unwrap();
        assert_eq!(nested.record_id().as_deref(), Some("99"));

        let none: Record = serde_json::from_value(json!({"properties": {}})).unwrap();
        assert_eq!(none.record_id(), None);
    }

    #[test]
    fn test_record_roundtrips_extra_fields() {
        let raw = json!({
            "id": "1",
            "properties": {"email": "a@b.c"},
            "createdAt": "2024-01-01T00:00:00Z",
            "archived": false
        });
        let record: Record = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn test_property_text_rendering() {
        let record: Record = serde_json::from_value(json!({
            "properties": {"a": "x", "b": 3, "c": null, "d": true}
        }))
        .unwrap();
        assert_eq!(record.property_text("a"), "x");
        assert_eq!(record.property_text("b"), "3");
        assert_eq!(record.property_text("c"), "");
        assert_eq!(record.property_text("d"), "true");
        assert_eq!(record.property_text("missing"), "");
    }
}
