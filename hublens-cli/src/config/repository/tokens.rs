//! Token persistence
//!
//! The token is stored under the individual state keys (`accessToken`,
//! `refreshToken`, `expiresAt`) rather than one blob, matching the layout
//! the rest of the state uses. Only the auth manager writes here.

use anyhow::Result;

use super::{keys, Store};
use crate::api::auth::TokenInfo;

impl Store {
    /// The stored token pair, or `None` when not connected
    pub async fn get_token(&self) -> Result<Option<TokenInfo>> {
        let access: Option<String> = self.get_value(keys::ACCESS_TOKEN).await?;
        let refresh: Option<String> = self.get_value(keys::REFRESH_TOKEN).await?;
        let expires_at: Option<i64> = self.get_value(keys::EXPIRES_AT).await?;

        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(TokenInfo {
                access_token,
                refresh_token,
                expires_at,
            }),
            _ => None,
        })
    }

    /// Overwrite the stored token pair
    pub async fn set_token(&self, token: &TokenInfo) -> Result<()> {
        self.set_value(keys::ACCESS_TOKEN, &token.access_token).await?;
        self.set_value(keys::REFRESH_TOKEN, &token.refresh_token).await?;
        match token.expires_at {
            Some(at) => self.set_value(keys::EXPIRES_AT, &at).await?,
            None => self.remove_value(keys::EXPIRES_AT).await?,
        }
        Ok(())
    }

    /// Forget the token and the portal it belonged to
    pub async fn clear_token(&self) -> Result<()> {
        self.remove_value(keys::ACCESS_TOKEN).await?;
        self.remove_value(keys::REFRESH_TOKEN).await?;
        self.remove_value(keys::EXPIRES_AT).await?;
        self.remove_value(keys::PORTAL_ID).await?;
        Ok(())
    }

    pub async fn get_portal_id(&self) -> Result<Option<u64>> {
        self.get_value(keys::PORTAL_ID).await
    }

    pub async fn set_portal_id(&self, portal_id: u64) -> Result<()> {
        self.set_value(keys::PORTAL_ID, &portal_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_roundtrip() {
        let store = Store::open_in_memory().await.unwrap();
        assert!(store.get_token().await.unwrap().is_none());

        let token = TokenInfo {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
            expires_at: Some(1_700_000_000_000),
        };
        store.set_token(&token).await.unwrap();

        let loaded = store.get_token().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token, "refresh-1");
        assert_eq!(loaded.expires_at, Some(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .set_token(&TokenInfo {
                access_token: "a".into(),
                refresh_token: "r".into(),
                expires_at: None,
            })
            .await
            .unwrap();
        store.set_portal_id(42).await.unwrap();

        store.clear_token().await.unwrap();

        assert!(store.get_token().await.unwrap().is_none());
        assert!(store.get_portal_id().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_without_expiry() {
        let store = Store::open_in_memory().await.unwrap();
        store
            .set_token(&TokenInfo {
                access_token: "a".into(),
                refresh_token: "r".into(),
                expires_at: Some(5),
            })
            .await
            .unwrap();
        // overwriting with an expiry-less token clears the old expiry
        store
            .set_token(&TokenInfo {
                access_token: "a2".into(),
                refresh_token: "r2".into(),
                expires_at: None,
            })
            .await
            .unwrap();
        let loaded = store.get_token().await.unwrap().unwrap();
        assert_eq!(loaded.expires_at, None);
    }
}
