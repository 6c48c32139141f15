//! Filter types and the operator vocabulary for the search endpoint
//!
//! Filters inside a group AND together; multiple groups OR at the API
//! level. Operators carry a client-facing name (what users type) and a wire
//! name (what the search endpoint expects); existence checks carry no value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::error::ApiError;

/// Comparison operator for a property filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsKnown,
    IsUnknown,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 12] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::IsKnown,
        Self::IsUnknown,
    ];

    /// Name sent to the search endpoint
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NEQ",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Contains => "CONTAINS_TOKEN",
            Self::NotContains => "NOT_CONTAINS_TOKEN",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::IsKnown => "HAS_PROPERTY",
            Self::IsUnknown => "NOT_HAS_PROPERTY",
        }
    }

    /// Name users type on the command line
    pub fn client_name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::IsKnown => "is_known",
            Self::IsUnknown => "is_unknown",
        }
    }

    /// Existence-checking operators take no value
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::IsKnown | Self::IsUnknown)
    }

    fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_name() == s)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.client_name())
    }
}

impl FromStr for FilterOperator {
    type Err = ApiError;

    /// Accepts the client-facing vocabulary, with raw wire names passed
    /// through for callers replaying stored queries.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.client_name() == s)
            .or_else(|| Self::from_wire(s))
            .ok_or_else(|| {
                ApiError::ValidationError(format!(
                    "unknown filter operator '{s}' (expected one of: {})",
                    Self::ALL.map(|op| op.client_name()).join(", ")
                ))
            })
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// One property filter in the wire shape the search endpoint expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Filter {
    /// Build a filter, dropping the value for existence-checking operators
    pub fn new(
        property_name: impl Into<String>,
        operator: FilterOperator,
        value: Option<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: if operator.takes_value() { value } else { None },
        }
    }
}

/// A conjunctive (AND) set of filters; groups OR together at the API level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}
