//! Engine configuration persisted as JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kanbox_api::model::DEFAULT_PAGE_LIMIT;
use kanbox_api::{BoardQuery, EmailListQuery, HttpMailApi};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Engine settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the mail backend REST API.
    pub api_base_url: String,
    /// Bearer token sent with every request.
    pub access_token: Option<String>,
    /// Snooze service tick in milliseconds.
    pub snooze_tick_ms: u64,
    /// Page size for mailbox listings.
    pub page_limit: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Board filters applied on startup.
    pub board: BoardQuery,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api/v1".to_string(),
            access_token: None,
            snooze_tick_ms: 1000,
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout_secs: 30,
            board: BoardQuery::default(),
        }
    }
}

impl EngineConfig {
    /// First page of a mailbox listing, sized by `page_limit`.
    #[must_use]
    pub fn list_query(&self, mailbox: impl Into<String>) -> EmailListQuery {
        EmailListQuery::first_page(mailbox).with_limit(self.page_limit)
    }

    /// Default location: `<config dir>/kanbox/config.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanbox")
            .join("config.json")
    }

    /// Loads the configuration, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// values are out of range.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url is empty".into()));
        }
        if self.snooze_tick_ms == 0 {
            return Err(Error::Config("snooze_tick_ms must be positive".into()));
        }
        if self.page_limit == 0 {
            return Err(Error::Config("page_limit must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Snooze service tick.
    #[must_use]
    pub const fn snooze_tick(&self) -> Duration {
        Duration::from_millis(self.snooze_tick_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the HTTP backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn http_api(&self) -> Result<HttpMailApi> {
        let api = HttpMailApi::new(&self.api_base_url, self.request_timeout())?;
        Ok(match &self.access_token {
            Some(token) => api.with_access_token(token.clone()),
            None => api,
        })
    }
}
