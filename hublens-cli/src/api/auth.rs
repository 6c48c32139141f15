//! OAuth token management
//!
//! Owns the token lifecycle: the initial code-for-token exchange, expiry
//! checks against the reactive/proactive margins, and refresh-token
//! exchange. The stored token is only ever overwritten on a successful
//! exchange; a rejected refresh leaves the store untouched.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};

use crate::api::constants::{
    AUTHORIZE_URL, DEFAULT_EXPIRES_IN_SECS, OPTIONAL_SCOPES, PROACTIVE_REFRESH_MARGIN_MS,
    REACTIVE_REFRESH_MARGIN_MS, REQUIRED_SCOPES, SIMPLE_REQUEST_TIMEOUT,
};
use crate::api::error::ApiError;
use crate::api::models::{AccessTokenInfo, OAuthTokenResponse};
use crate::config::repository::Store;
use crate::config::Settings;

/// Stored token state: access/refresh pair plus expiry in epoch millis.
/// `expires_at` is optional; a token without one is assumed usable.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<i64>,
}

/// Whether the token needs renewal before an operation that requires it.
/// Absent expiry is treated optimistically.
pub fn needs_refresh(expires_at: Option<i64>, now_ms: i64, margin_ms: i64) -> bool {
    match expires_at {
        Some(at) => now_ms >= at - margin_ms,
        None => false,
    }
}

/// Token lifecycle manager bound to one settings/store pair
#[derive(Clone)]
pub struct AuthManager {
    http: reqwest::Client,
    settings: Settings,
    store: Store,
}

impl AuthManager {
    pub fn new(http: reqwest::Client, settings: Settings, store: Store) -> Self {
        Self { http, settings, store }
    }

    /// URL the user opens in a browser to authorize the app. The redirect
    /// lands on the configured redirect URI carrying a `code` parameter.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&optional_scope={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(&REQUIRED_SCOPES.join(" ")),
            urlencoding::encode(&OPTIONAL_SCOPES.join(" ")),
        )
    }

    /// Exchange an authorization code for a token pair and persist it
    pub async fn exchange_code(&self, code: &str) -> Result<TokenInfo> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.settings.redirect_uri),
            ("client_id", &self.settings.client_id),
            ("client_secret", &self.settings.client_secret),
        ];
        let body = self.token_request(&params).await?;
        let access_token = body.access_token.ok_or_else(|| {
            ApiError::AuthenticationRequired("token exchange returned no access token".into())
        })?;
        let refresh_token = body.refresh_token.ok_or_else(|| {
            ApiError::AuthenticationRequired("token exchange returned no refresh token".into())
        })?;

        let info = TokenInfo {
            access_token,
            refresh_token,
            expires_at: Some(expiry_from_now(body.expires_in)),
        };
        self.store.set_token(&info).await?;
        info!("connected; token stored");
        Ok(info)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Exactly one network call, no internal retries. On success the store
    /// is overwritten (keeping the previous refresh token if the response
    /// omits a new one); on failure it is left untouched and the caller
    /// decides whether to prompt for reauthorization.
    pub async fn refresh(&self) -> Result<TokenInfo> {
        let current = self.store.get_token().await?.ok_or_else(|| {
            ApiError::AuthenticationRequired(
                "not connected; run `hublens-cli auth connect` first".into(),
            )
        })?;

        debug!("refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", &current.refresh_token),
            ("client_id", &self.settings.client_id),
            ("client_secret", &self.settings.client_secret),
        ];
        let response = self
            .http
            .post(format!("{}/oauth/v1/token", self.settings.api_base_url))
            .form(&params)
            .timeout(SIMPLE_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let message = token_error_message(response, status).await;
            warn!("token refresh rejected: {message}");
            return Err(ApiError::RefreshFailed(message).into());
        }

        let body: OAuthTokenResponse = response
            .json()
            .await
            .context("Failed to parse the token endpoint response")?;
        let Some(access_token) = body.access_token else {
            return Err(
                ApiError::RefreshFailed("response contained no access token".into()).into(),
            );
        };

        let info = TokenInfo {
            access_token,
            refresh_token: body.refresh_token.unwrap_or(current.refresh_token),
            expires_at: Some(expiry_from_now(body.expires_in)),
        };
        self.store.set_token(&info).await?;
        info!("access token refreshed");
        Ok(info)
    }

    /// Return an access token that is fresh under the reactive margin,
    /// refreshing on demand. A failed refresh escalates to
    /// `AuthenticationRequired` so no API path proceeds with a stale token.
    pub async fn ensure_fresh(&self) -> Result<String> {
        let token = self.store.get_token().await?.ok_or_else(|| {
            ApiError::AuthenticationRequired(
                "not connected; run `hublens-cli auth connect` first".into(),
            )
        })?;

        if !needs_refresh(token.expires_at, Utc::now().timestamp_millis(), REACTIVE_REFRESH_MARGIN_MS)
        {
            return Ok(token.access_token);
        }

        match self.refresh().await {
            Ok(fresh) => Ok(fresh.access_token),
            Err(err) => Err(ApiError::AuthenticationRequired(format!(
                "{err}; reconnect with `hublens-cli auth connect`"
            ))
            .into()),
        }
    }

    /// Refresh under the wider proactive margin, e.g. before a long
    /// interactive session. Returns whether a refresh actually happened.
    pub async fn refresh_if_expiring(&self) -> Result<bool> {
        let Some(token) = self.store.get_token().await? else {
            return Ok(false);
        };
        if needs_refresh(token.expires_at, Utc::now().timestamp_millis(), PROACTIVE_REFRESH_MARGIN_MS)
        {
            self.refresh().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Look up the portal (hub) behind an access token and persist its id
    pub async fn fetch_portal_id(&self, access_token: &str) -> Result<u64> {
        let response = self
            .http
            .get(format!(
                "{}/oauth/v1/access-tokens/{}",
                self.settings.api_base_url, access_token
            ))
            .bearer_auth(access_token)
            .timeout(SIMPLE_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to look up portal info")?;

        let status = response.status();
        if !status.is_success() {
            let message = token_error_message(response, status).await;
            return Err(ApiError::UpstreamRequestFailed {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let info: AccessTokenInfo = response
            .json()
            .await
            .context("Failed to parse portal info response")?;
        self.store.set_portal_id(info.hub_id).await?;
        Ok(info.hub_id)
    }

    /// Forget the stored token and portal id
    pub async fn disconnect(&self) -> Result<()> {
        self.store.clear_token().await?;
        info!("disconnected; stored token cleared");
        Ok(())
    }
}

fn expiry_from_now(expires_in: Option<i64>) -> i64 {
    Utc::now().timestamp_millis() + expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS) * 1000
}

/// Message from a failed token-endpoint response: `error_description` or
/// `message` from the JSON body, else a synthesized status line.
async fn token_error_message(response: reqwest::Response, status: reqwest::StatusCode) -> String {
    let fallback = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let Ok(body) = response.text().await else {
        return fallback;
    };
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["error_description", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(String::from))
        })
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_refresh_reactive_margin() {
        let now = 1_700_000_000_000;
        // 30s left: inside the 60s reactive margin
        assert!(needs_refresh(Some(now + 30_000), now, REACTIVE_REFRESH_MARGIN_MS));
        // 120s left: outside it
        assert!(!needs_refresh(Some(now + 120_000), now, REACTIVE_REFRESH_MARGIN_MS));
        // already expired
        assert!(needs_refresh(Some(now - 1), now, REACTIVE_REFRESH_MARGIN_MS));
    }

    #[test]
    fn test_needs_refresh_proactive_margin() {
        let now = 1_700_000_000_000;
        // 120s left: fresh under the reactive margin but not the proactive one
        assert!(needs_refresh(Some(now + 120_000), now, PROACTIVE_REFRESH_MARGIN_MS));
        assert!(!needs_refresh(Some(now + 600_000), now, PROACTIVE_REFRESH_MARGIN_MS));
    }

    #[test]
    fn test_absent_expiry_is_optimistic() {
        assert!(!needs_refresh(None, 1_700_000_000_000, REACTIVE_REFRESH_MARGIN_MS));
    }
}
