//! Configuration: app credentials and the local store
//!
//! Settings come from a TOML file under the platform config directory with
//! `HUBLENS_*` environment variables taking precedence. The store is a
//! SQLite database under the platform data directory. Everything is owned
//! by a single [`Config`] built in `main` and passed down by reference; no
//! ambient globals.

pub mod repository;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::api::constants::API_BASE_URL;
use repository::Store;

/// App credentials and endpoints from settings.toml / environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/oauth/callback".to_string()
}

fn default_api_base_url() -> String {
    API_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Settings {
    /// Load settings.toml (if present) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::settings_path()?;
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(id) = std::env::var("HUBLENS_CLIENT_ID") {
            settings.client_id = id;
        }
        if let Ok(secret) = std::env::var("HUBLENS_CLIENT_SECRET") {
            settings.client_secret = secret;
        }
        if let Ok(uri) = std::env::var("HUBLENS_REDIRECT_URI") {
            settings.redirect_uri = uri;
        }
        if let Ok(base) = std::env::var("HUBLENS_API_BASE_URL") {
            settings.api_base_url = base;
        }

        Ok(settings)
    }

    /// Persist to settings.toml, creating the config directory if needed
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Commands that talk to the API need app credentials configured
    pub fn require_credentials(&self) -> Result<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            anyhow::bail!(
                "no app credentials configured; run `hublens-cli auth setup` or set \
                 HUBLENS_CLIENT_ID / HUBLENS_CLIENT_SECRET"
            );
        }
        Ok(())
    }

    fn settings_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine the config directory")?;
        Ok(dir.join("hublens").join("settings.toml"))
    }
}

/// Session-scoped state: settings plus the open store
pub struct Config {
    pub settings: Settings,
    pub store: Store,
}

impl Config {
    pub async fn load() -> Result<Self> {
        let settings = Settings::load()?;
        let data_dir = dirs::data_dir()
            .context("Could not determine the data directory")?
            .join("hublens");
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let store = Store::open(&data_dir.join("hublens.db")).await?;
        Ok(Self { settings, store })
    }
}
