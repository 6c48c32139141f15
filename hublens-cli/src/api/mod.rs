//! HubSpot v3 Web API Module
//!
//! Complete client-side interface to the HubSpot CRM API: OAuth token
//! lifecycle, paginated query execution over the search/list endpoints,
//! record and property-metadata fetches, and the typed error taxonomy.

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod models;
pub mod query;

pub use auth::{AuthManager, TokenInfo};
pub use client::HubSpotClient;
pub use error::ApiError;
pub use models::{PropertyMetadata, Record, ResultPage};
pub use query::{Filter, FilterGroup, FilterOperator, PageSource, QueryBuilder, QueryDescriptor, QueryResult};
