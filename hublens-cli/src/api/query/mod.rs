//! Query construction and paginated execution
//!
//! Follows the same pattern as the rest of the API layer: a reusable
//! descriptor ([`QueryDescriptor`]), a fluent [`QueryBuilder`], and an
//! executor that drives the cursor loop against a [`PageSource`].

pub mod builder;
pub mod executor;
pub mod filters;
pub mod query;
pub mod result;

pub use builder::QueryBuilder;
pub use executor::PageSource;
pub use filters::{Filter, FilterGroup, FilterOperator};
pub use query::QueryDescriptor;
pub use result::QueryResult;
