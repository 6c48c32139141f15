//! Repository layer for the local store
//!
//! The store mirrors the extension-era state layout: a single key-value
//! table holding JSON values under well-known keys. Each concern (tokens,
//! query cache, quick links) gets its own repository module; every mutating
//! operation writes the full updated value back before returning.
//!
//! There are no transactional guarantees across processes: two concurrent
//! writers race read-modify-write and the last write wins on the whole
//! list. Accepted for a single-user local tool.

pub mod kv;
pub mod queries;
pub mod quick_links;
pub mod tokens;

pub use queries::CachedQuery;
pub use quick_links::QuickLink;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Well-known keys in the key-value table
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const EXPIRES_AT: &str = "expiresAt";
    pub const PORTAL_ID: &str = "portalId";
    pub const RECENT_QUERIES: &str = "recentQueries";
    pub const SAVED_QUERIES: &str = "savedQueries";
    pub const QUICK_LINKS: &str = "quickLinks";
    pub const PROPERTIES_BY_OBJECT: &str = "propertiesByObject";
    pub const PROPERTIES_FETCHED_AT: &str = "propertiesFetchedAt";
}

/// Handle to the SQLite-backed key-value store
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    /// Open (and create if missing) the store at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to open the store at {}", path.display()))?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests. A single connection keeps every handle on
    /// the same database.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        use sqlx::sqlite::SqlitePoolOptions;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open the in-memory store")?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                 key TEXT PRIMARY KEY,
                 value TEXT NOT NULL
             )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to initialize the store schema")?;
        Ok(())
    }
}
