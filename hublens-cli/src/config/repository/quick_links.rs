//! Quick-link bookmarks
//!
//! A small ordered list of HubSpot app URLs: capacity 10, unique URLs,
//! positional reorder. Only https URLs on app.hubspot.com (or a regional
//! app-<region>.hubspot.com) are accepted.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{keys, Store};
use crate::api::constants::QUICK_LINKS_CAP;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLink {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Accepts `https://app.hubspot.com/...` and regional hosts like
/// `https://app-eu1.hubspot.com/...`
pub fn is_valid_hubspot_url(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "https" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host == "app.hubspot.com" {
        return true;
    }
    host.strip_prefix("app-")
        .and_then(|rest| rest.strip_suffix(".hubspot.com"))
        .is_some_and(|region| {
            !region.is_empty()
                && region.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

impl Store {
    pub async fn quick_links(&self) -> Result<Vec<QuickLink>> {
        Ok(self.get_value(keys::QUICK_LINKS).await?.unwrap_or_default())
    }

    /// Add a bookmark. Rejects when the list is full, the URL is already
    /// bookmarked, or the URL is not a HubSpot app URL.
    pub async fn add_quick_link(
        &self,
        name: &str,
        url: &str,
        icon: &str,
        description: &str,
        color: &str,
    ) -> Result<QuickLink> {
        let mut links = self.quick_links().await?;

        if links.len() >= QUICK_LINKS_CAP {
            anyhow::bail!("maximum of {QUICK_LINKS_CAP} quick links; remove one first");
        }
        if links.iter().any(|link| link.url == url) {
            anyhow::bail!("this URL is already in your quick links");
        }
        if !is_valid_hubspot_url(url) {
            anyhow::bail!("expected a HubSpot URL starting with https://app.hubspot.com/");
        }

        let link = QuickLink {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            url: url.trim().to_string(),
            icon: icon.to_string(),
            description: description.trim().to_string(),
            color: color.to_string(),
            created_at: Utc::now(),
        };
        links.push(link.clone());
        self.set_value(keys::QUICK_LINKS, &links).await?;
        Ok(link)
    }

    /// Remove a bookmark by id; no error if absent
    pub async fn remove_quick_link(&self, id: &str) -> Result<()> {
        let mut links = self.quick_links().await?;
        links.retain(|link| link.id != id);
        self.set_value(keys::QUICK_LINKS, &links).await?;
        Ok(())
    }

    /// Move the link at `from` to position `to`, shifting the rest.
    /// Out-of-range positions are clamped; a missing source slot is a no-op.
    pub async fn move_quick_link(&self, from: usize, to: usize) -> Result<()> {
        let mut links = self.quick_links().await?;
        if from >= links.len() {
            warn!("no quick link at slot {from}");
            return Ok(());
        }
        let link = links.remove(from);
        let to = to.min(links.len());
        links.insert(to, link);
        self.set_value(keys::QUICK_LINKS, &links).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn add(store: &Store, name: &str, url: &str) -> Result<QuickLink> {
        store.add_quick_link(name, url, "🔗", "", "").await
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_hubspot_url("https://app.hubspot.com/contacts/123"));
        assert!(is_valid_hubspot_url("https://app-eu1.hubspot.com/reports"));
        assert!(!is_valid_hubspot_url("http://app.hubspot.com/contacts"));
        assert!(!is_valid_hubspot_url("https://evil.com/app.hubspot.com"));
        assert!(!is_valid_hubspot_url("https://app-.hubspot.com/x"));
        assert!(!is_valid_hubspot_url("not a url"));
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let store = Store::open_in_memory().await.unwrap();
        add(&store, "Contacts", "https://app.hubspot.com/contacts/1").await.unwrap();
        add(&store, "Deals", "https://app.hubspot.com/deals/1").await.unwrap();

        let links = store.quick_links().await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "Contacts");
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected() {
        let store = Store::open_in_memory().await.unwrap();
        add(&store, "One", "https://app.hubspot.com/contacts/1").await.unwrap();
        let err = add(&store, "Two", "https://app.hubspot.com/contacts/1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already"));
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let store = Store::open_in_memory().await.unwrap();
        for i in 0..QUICK_LINKS_CAP {
            add(&store, "L", &format!("https://app.hubspot.com/p/{i}")).await.unwrap();
        }
        let err = add(&store, "Over", "https://app.hubspot.com/p/extra")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maximum"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        let link = add(&store, "L", "https://app.hubspot.com/p/1").await.unwrap();
        store.remove_quick_link(&link.id).await.unwrap();
        store.remove_quick_link(&link.id).await.unwrap();
        assert!(store.quick_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_reorders() {
        let store = Store::open_in_memory().await.unwrap();
        for name in ["a", "b", "c"] {
            add(&store, name, &format!("https://app.hubspot.com/p/{name}")).await.unwrap();
        }

        store.move_quick_link(0, 2).await.unwrap();
        let names: Vec<String> = store
            .quick_links()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        // out-of-range source is a no-op, out-of-range target clamps
        store.move_quick_link(9, 0).await.unwrap();
        store.move_quick_link(0, 9).await.unwrap();
        let names: Vec<String> = store
            .quick_links()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
