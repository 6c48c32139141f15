//! Property metadata with a daily cache
//!
//! Property names are fetched per object type, sorted, and cached in the
//! key-value store for 24 hours. A failed fetch falls back to whatever was
//! cached, then to a hard-coded list for the standard object types, so
//! autocomplete-style callers always get something usable.

use anyhow::Result;
use chrono::Utc;
use log::warn;
use std::collections::HashMap;

use crate::api::client::HubSpotClient;
use crate::api::constants::PROPERTY_CACHE_TTL_MS;
use crate::config::repository::{keys, Store};

/// Property names for an object type, served from the cache when fresh
pub async fn property_names(
    client: &HubSpotClient,
    store: &Store,
    object_type: &str,
) -> Result<Vec<String>> {
    let mut by_object: HashMap<String, Vec<String>> = store
        .get_value(keys::PROPERTIES_BY_OBJECT)
        .await?
        .unwrap_or_default();
    let fetched_at: Option<i64> = store.get_value(keys::PROPERTIES_FETCHED_AT).await?;

    let now = Utc::now().timestamp_millis();
    let stale = fetched_at.is_none_or(|at| now - at > PROPERTY_CACHE_TTL_MS);

    if !stale {
        if let Some(names) = by_object.get(object_type) {
            return Ok(names.clone());
        }
    }

    match client.fetch_property_metadata(object_type).await {
        Ok(metadata) => {
            let mut names: Vec<String> = metadata.into_iter().map(|p| p.name).collect();
            names.sort();
            by_object.insert(object_type.to_string(), names.clone());
            store.set_value(keys::PROPERTIES_BY_OBJECT, &by_object).await?;
            store.set_value(keys::PROPERTIES_FETCHED_AT, &now).await?;
            Ok(names)
        }
        Err(err) => {
            warn!("property fetch for {object_type} failed ({err}); using cached or fallback list");
            match by_object.remove(object_type) {
                Some(cached) => Ok(cached),
                None => Ok(fallback_properties(object_type)),
            }
        }
    }
}

/// Minimal property sets for the standard object types, used when the API
/// is unreachable and nothing is cached
pub fn fallback_properties(object_type: &str) -> Vec<String> {
    let names: &[&str] = match object_type {
        "contacts" => &[
            "name", "email", "company", "phone", "createdate", "lastmodifieddate",
            "lifecyclestage", "leadstatus",
        ],
        "companies" => &[
            "name", "domain", "phone", "createdate", "lastmodifieddate", "lifecyclestage",
            "industry",
        ],
        "deals" => &[
            "dealname", "amount", "dealstage", "closedate", "createdate", "lastmodifieddate",
            "pipeline",
        ],
        "tickets" => &[
            "subject", "content", "ticket_pipeline", "ticket_stage", "createdate",
            "lastmodifieddate",
        ],
        _ => &["name", "createdate", "lastmodifieddate"],
    };
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_properties_cover_standard_types() {
        assert!(fallback_properties("contacts").contains(&"email".to_string()));
        assert!(fallback_properties("deals").contains(&"dealname".to_string()));
        // unknown object types get the generic minimal set
        assert_eq!(
            fallback_properties("p_machines"),
            vec!["name", "createdate", "lastmodifieddate"]
        );
    }
}
