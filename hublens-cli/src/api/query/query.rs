//! Query descriptor: one executable query against the objects API

use serde::{Deserialize, Serialize};

use crate::api::constants::DEFAULT_TARGET_LIMIT;
use crate::api::error::ApiError;
use crate::api::query::filters::FilterGroup;

/// Everything needed to execute one query: object type, property selection
/// (insertion order matters for display), filter groups, and an optional
/// record limit. Immutable for the duration of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub object_type: String,
    pub properties: Vec<String>,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryDescriptor {
    pub fn new(object_type: impl Into<String>, properties: Vec<String>) -> Self {
        Self {
            object_type: object_type.into(),
            properties,
            filter_groups: Vec::new(),
            limit: None,
        }
    }

    /// Executability check: both the object type and the property selection
    /// must be non-empty before any request is built.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.object_type.trim().is_empty() {
            return Err(ApiError::ValidationError("object type must not be empty".into()));
        }
        if self.properties.is_empty() {
            return Err(ApiError::ValidationError(
                "select at least one property to query".into(),
            ));
        }
        Ok(())
    }

    /// Resolved record target: the caller's limit, or the practical
    /// "unlimited" ceiling when none was given.
    pub fn target_limit(&self) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => limit as usize,
            _ => DEFAULT_TARGET_LIMIT,
        }
    }

    /// Filtered queries go to the search endpoint, unfiltered to list
    pub fn has_filters(&self) -> bool {
        !self.filter_groups.is_empty()
    }

    /// API path for this object type. Standard and custom object types
    /// share the same `/crm/v3/objects/{type}` layout, so custom API names
    /// pass straight through.
    pub fn endpoint_path(&self) -> String {
        format!("/crm/v3/objects/{}", self.object_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_fields() {
        let no_props = QueryDescriptor::new("contacts", vec![]);
        assert!(matches!(no_props.validate(), Err(ApiError::ValidationError(_))));

        let no_object = QueryDescriptor::new("  ", vec!["email".into()]);
        assert!(matches!(no_object.validate(), Err(ApiError::ValidationError(_))));

        let ok = QueryDescriptor::new("contacts", vec!["email".into()]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_target_limit_resolution() {
        let mut descriptor = QueryDescriptor::new("deals", vec!["dealname".into()]);
        assert_eq!(descriptor.target_limit(), DEFAULT_TARGET_LIMIT);

        descriptor.limit = Some(250);
        assert_eq!(descriptor.target_limit(), 250);

        descriptor.limit = Some(0);
        assert_eq!(descriptor.target_limit(), DEFAULT_TARGET_LIMIT);
    }

    #[test]
    fn test_endpoint_path_passthrough() {
        let standard = QueryDescriptor::new("contacts", vec!["email".into()]);
        assert_eq!(standard.endpoint_path(), "/crm/v3/objects/contacts");

        let custom = QueryDescriptor::new("p_machines", vec!["serial".into()]);
        assert_eq!(custom.endpoint_path(), "/crm/v3/objects/p_machines");
    }
}
