//! Query cache: recent and saved query lists
//!
//! Recent entries are auto-captured on successful execution, deduplicated
//! by query shape with promote-to-front, and capped at 20. Saved entries
//! are user-named, unbounded, and only removed explicitly. Every mutation
//! persists the full list(s) back to the store before returning.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{keys, Store};
use crate::api::constants::RECENT_QUERIES_CAP;
use crate::api::error::ApiError;
use crate::api::query::{FilterGroup, QueryDescriptor};

/// One cached query, in either the recent or the saved list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedQuery {
    pub id: String,
    pub name: String,
    pub object_type: String,
    pub properties: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_executed: DateTime<Utc>,
    pub execution_count: u32,
}

impl CachedQuery {
    fn from_descriptor(descriptor: &QueryDescriptor, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            object_type: descriptor.object_type.clone(),
            properties: descriptor.properties.clone(),
            filters: descriptor.filter_groups.clone(),
            limit: descriptor.limit,
            created_at: now,
            last_executed: now,
            execution_count: 1,
        }
    }

    /// Structural equality with a descriptor: object type, properties
    /// (order-sensitive), filters, and limit all match.
    pub fn matches_shape(&self, descriptor: &QueryDescriptor) -> bool {
        self.object_type == descriptor.object_type
            && self.properties == descriptor.properties
            && self.filters == descriptor.filter_groups
            && self.limit == descriptor.limit
    }

    /// Rebuild the executable descriptor from this entry
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            object_type: self.object_type.clone(),
            properties: self.properties.clone(),
            filter_groups: self.filters.clone(),
            limit: self.limit,
        }
    }
}

impl Store {
    pub async fn recent_queries(&self) -> Result<Vec<CachedQuery>> {
        Ok(self.get_value(keys::RECENT_QUERIES).await?.unwrap_or_default())
    }

    pub async fn saved_queries(&self) -> Result<Vec<CachedQuery>> {
        Ok(self.get_value(keys::SAVED_QUERIES).await?.unwrap_or_default())
    }

    /// Capture an executed query in the recent list.
    ///
    /// An entry with the same shape is updated in place (count incremented,
    /// timestamp refreshed) and moved to the front; otherwise a new entry is
    /// prepended. The list is then truncated to capacity, dropping the
    /// least-recently-executed tail.
    pub async fn save_to_recent(&self, descriptor: &QueryDescriptor) -> Result<CachedQuery> {
        let mut recent = self.recent_queries().await?;
        let now = Utc::now();

        if let Some(index) = recent.iter().position(|q| q.matches_shape(descriptor)) {
            let mut entry = recent.remove(index);
            entry.execution_count += 1;
            entry.last_executed = now;
            recent.insert(0, entry);
        } else {
            let name = format!("Query {}", now.format("%Y-%m-%d %H:%M:%S"));
            recent.insert(0, CachedQuery::from_descriptor(descriptor, name, now));
        }

        recent.truncate(RECENT_QUERIES_CAP);
        self.set_value(keys::RECENT_QUERIES, &recent).await?;
        Ok(recent[0].clone())
    }

    /// Save a query under a user-chosen name. Names are unique
    /// (case-sensitive); a clash is rejected without touching the list.
    pub async fn save_query(
        &self,
        descriptor: &QueryDescriptor,
        name: &str,
    ) -> Result<CachedQuery> {
        let mut saved = self.saved_queries().await?;
        if saved.iter().any(|q| q.name == name) {
            return Err(ApiError::DuplicateName(name.to_string()).into());
        }

        let entry = CachedQuery::from_descriptor(descriptor, name.to_string(), Utc::now());
        saved.push(entry.clone());
        self.set_value(keys::SAVED_QUERIES, &saved).await?;
        Ok(entry)
    }

    /// Load a cached query by id, searching saved entries before recent
    /// ones. Refreshes the execution metadata as a side effect and persists
    /// the change.
    pub async fn load_query(&self, id: &str) -> Result<CachedQuery> {
        let mut saved = self.saved_queries().await?;
        let mut recent = self.recent_queries().await?;
        let now = Utc::now();

        let entry = saved
            .iter_mut()
            .find(|q| q.id == id)
            .or_else(|| recent.iter_mut().find(|q| q.id == id))
            .ok_or_else(|| ApiError::NotFound(format!("no cached query with id {id}")))?;

        entry.execution_count += 1;
        entry.last_executed = now;
        let loaded = entry.clone();

        self.set_value(keys::SAVED_QUERIES, &saved).await?;
        self.set_value(keys::RECENT_QUERIES, &recent).await?;
        Ok(loaded)
    }

    /// Remove a saved query by id; succeeds whether or not it existed
    pub async fn delete_saved_query(&self, id: &str) -> Result<()> {
        let mut saved = self.saved_queries().await?;
        saved.retain(|q| q.id != id);
        self.set_value(keys::SAVED_QUERIES, &saved).await?;
        Ok(())
    }
}
