//! HTTP client for the HubSpot v3 Web API
//!
//! All network access for CRM data goes through this type. Responses are
//! normalized at this boundary: non-2xx statuses become typed errors
//! carrying the upstream message, and result payloads are folded into the
//! canonical [`ResultPage`] shape.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use crate::api::auth::AuthManager;
use crate::api::constants::{PAGINATED_REQUEST_TIMEOUT, SIMPLE_REQUEST_TIMEOUT};
use crate::api::error::ApiError;
use crate::api::models::{PropertyMetadata, Record, ResultPage};
use crate::api::query::executor::{self, PageSource};
use crate::api::query::{QueryDescriptor, QueryResult};
use crate::config::repository::Store;
use crate::config::Settings;

pub struct HubSpotClient {
    http: reqwest::Client,
    settings: Settings,
    store: Store,
    auth: AuthManager,
}

impl HubSpotClient {
    pub fn new(settings: Settings, store: Store) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hublens-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build the HTTP client")?;
        let auth = AuthManager::new(http.clone(), settings.clone(), store.clone());
        Ok(Self { http, settings, store, auth })
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Execute a query descriptor to completion.
    ///
    /// Freshness is ensured once up front; the page source re-reads the
    /// stored access token per batch, so a long pagination that crosses an
    /// expiry boundary picks up a refreshed token transparently.
    pub async fn execute_query(&self, descriptor: &QueryDescriptor) -> Result<QueryResult> {
        descriptor.validate()?;
        self.auth.ensure_fresh().await?;
        executor::run(self, descriptor).await
    }

    /// Fetch one record by id with a property selection
    pub async fn fetch_record(
        &self,
        object_type: &str,
        id: &str,
        properties: &[String],
    ) -> Result<Record> {
        let access_token = self.auth.ensure_fresh().await?;
        let url = format!("{}/crm/v3/objects/{object_type}/{id}", self.settings.api_base_url);
        let response = self
            .http
            .get(url)
            .query(&[("properties", properties.join(","))])
            .bearer_auth(access_token)
            .timeout(SIMPLE_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach the HubSpot API")?;
        let value = handle_response(response).await?;
        serde_json::from_value(value).context("Failed to parse the record response")
    }

    /// Fetch property metadata for an object type
    pub async fn fetch_property_metadata(&self, object_type: &str) -> Result<Vec<PropertyMetadata>> {
        let access_token = self.auth.ensure_fresh().await?;
        let url = format!("{}/crm/v3/properties/{object_type}", self.settings.api_base_url);
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .timeout(SIMPLE_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach the HubSpot API")?;
        let value = handle_response(response).await?;
        let results = value
            .get("results")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("property metadata response had no 'results'"))?;
        serde_json::from_value(results).context("Failed to parse property metadata")
    }

    async fn current_access_token(&self) -> Result<String> {
        let token = self.store.get_token().await?.ok_or_else(|| {
            ApiError::AuthenticationRequired(
                "not connected; run `hublens-cli auth connect` first".into(),
            )
        })?;
        Ok(token.access_token)
    }

    /// One page against the search endpoint (filtered queries)
    async fn search_page(
        &self,
        descriptor: &QueryDescriptor,
        cursor: Option<&str>,
        batch_size: usize,
        access_token: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}{}/search",
            self.settings.api_base_url,
            descriptor.endpoint_path()
        );
        let mut body = json!({
            "limit": batch_size,
            "properties": descriptor.properties,
            "filterGroups": descriptor.filter_groups,
        });
        if let Some(after) = cursor {
            body["after"] = Value::from(after);
        }
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .json(&body)
            .bearer_auth(access_token)
            .timeout(PAGINATED_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach the HubSpot API")?;
        handle_response(response).await
    }

    /// One page against the list endpoint (unfiltered queries)
    async fn list_page(
        &self,
        descriptor: &QueryDescriptor,
        cursor: Option<&str>,
        batch_size: usize,
        access_token: &str,
    ) -> Result<Value> {
        let url = format!("{}{}", self.settings.api_base_url, descriptor.endpoint_path());
        let mut params = vec![
            ("limit", batch_size.to_string()),
            ("properties", descriptor.properties.join(",")),
        ];
        if let Some(after) = cursor {
            params.push(("after", after.to_string()));
        }
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(&params)
            .bearer_auth(access_token)
            .timeout(PAGINATED_REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach the HubSpot API")?;
        handle_response(response).await
    }
}

#[async_trait]
impl PageSource for HubSpotClient {
    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        cursor: Option<&str>,
        batch_size: usize,
    ) -> Result<ResultPage> {
        let access_token = self.current_access_token().await?;
        let value = if descriptor.has_filters() {
            self.search_page(descriptor, cursor, batch_size, &access_token)
                .await?
        } else {
            self.list_page(descriptor, cursor, batch_size, &access_token)
                .await?
        };
        ResultPage::from_value(value)
    }
}

/// Map a response to its JSON body, normalizing failures to [`ApiError`].
///
/// 401 becomes `AuthenticationRequired`; any other non-2xx becomes
/// `UpstreamRequestFailed` carrying the upstream `message` when the error
/// body is JSON, else a synthesized "HTTP <status>: <status text>".
async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .context("Failed to parse the API response body");
    }

    let synthesized = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(synthesized),
        Err(_) => synthesized,
    };

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthenticationRequired(message).into());
    }
    Err(ApiError::UpstreamRequestFailed {
        status: status.as_u16(),
        message,
    }
    .into())
}
