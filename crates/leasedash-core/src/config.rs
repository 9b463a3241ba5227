//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, where the bearer token is kept, and the last used
//! login email and device label.
//!
//! Configuration is stored at `~/.config/leasedash/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::ClientOptions;
use crate::auth::{FileTokenStorage, KeyringTokenStorage, TokenStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "leasedash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "LEASEDASH_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Device label sent with the login request when none is configured
pub const DEFAULT_DEVICE_LABEL: &str = "leasedash-cli";

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub last_email: Option<String>,
    pub device_label: Option<String>,
    /// Per-request deadline. Requests wait indefinitely when unset.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// API base URL: `LEASEDASH_API_URL`, then the config file, then the
    /// built-in default.
    pub fn base_url(&self) -> String {
        self.resolve_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_base_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn device_label(&self) -> &str {
        self.device_label.as_deref().unwrap_or(DEFAULT_DEVICE_LABEL)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Build the durable token slot selected by `token_backend`.
    pub fn token_storage(&self) -> Result<Box<dyn TokenStorage>> {
        let storage: Box<dyn TokenStorage> = match self.token_backend {
            TokenBackend::File => Box::new(FileTokenStorage::in_dir(&self.cache_dir()?)),
            TokenBackend::Keyring => Box::new(KeyringTokenStorage::new()),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_base_url(None), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("https://reports.example.com/api/".to_string());
        assert_eq!(config.resolve_base_url(None), "https://reports.example.com/api");
        assert_eq!(
            config.resolve_base_url(Some("http://127.0.0.1:9000".to_string())),
            "http://127.0.0.1:9000"
        );
        assert_eq!(
            config.resolve_base_url(Some("  ".to_string())),
            "https://reports.example.com/api"
        );
    }

    #[test]
    fn test_config_parses_partial_file() {
        let config: Config = serde_json::from_str(r#"{"token_backend":"keyring"}"#).unwrap();
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.device_label(), DEFAULT_DEVICE_LABEL);

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.token_backend, TokenBackend::File);
        assert!(config.client_options().timeout.is_none());
    }

    #[test]
    fn test_client_options_from_config() {
        let config: Config = serde_json::from_str(
            r#"{"request_timeout_secs": 20, "user_agent": "dashboard/2.0"}"#,
        )
        .unwrap();
        let options = config.client_options();
        assert_eq!(options.timeout, Some(Duration::from_secs(20)));
        assert_eq!(options.user_agent.as_deref(), Some("dashboard/2.0"));
    }
}
