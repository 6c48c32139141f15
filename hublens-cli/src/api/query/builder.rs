//! Fluent builder for query descriptors

use anyhow::Result;

use crate::api::query::filters::{Filter, FilterGroup, FilterOperator};
use crate::api::query::query::QueryDescriptor;

/// Fluent construction of a [`QueryDescriptor`], validated on build.
///
/// Filters added here AND together as a single group. Descriptors with
/// several OR'd groups are built directly or replayed from the query cache.
///
/// ```ignore
/// let descriptor = QueryBuilder::new("contacts")
///     .properties(["email", "firstname"])
///     .filter("email", FilterOperator::Contains, Some("@acme.com".into()))
///     .limit(250)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    object_type: String,
    properties: Vec<String>,
    filters: Vec<Filter>,
    limit: Option<u32>,
}

impl QueryBuilder {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    /// Append a single property to the selection (order is preserved)
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    /// Append several properties to the selection
    pub fn properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a filter; all filters on one builder AND together
    pub fn filter(
        mut self,
        property: impl Into<String>,
        operator: FilterOperator,
        value: Option<String>,
    ) -> Self {
        self.filters.push(Filter::new(property, operator, value));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Finalize and validate the descriptor
    pub fn build(self) -> Result<QueryDescriptor> {
        let filter_groups = if self.filters.is_empty() {
            Vec::new()
        } else {
            vec![FilterGroup::new(self.filters)]
        };
        let descriptor = QueryDescriptor {
            object_type: self.object_type,
            properties: self.properties,
            filter_groups,
            limit: self.limit,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
