//! Run configuration.
//!
//! Everything a harvest needs is carried in plain structs handed to the
//! components that use them. Values come from an optional YAML file and are
//! then overridden by command-line flags (which themselves fall back to the
//! `DATABASE_URL_SQLITE` / `DATABASE_TABLE_SQLITE` environment variables).
//!
//! ```yaml
//! export_dir: dataset
//! storage:
//!   database: sqlite:///inshorts.db
//!   table: inshorts
//! pagination:
//!   max_triggers: 10
//!   throttle_ms: 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{HarvestError, Result};

/// Top-level configuration for one harvest run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Directory receiving CSV and JSON snapshots.
    pub export_dir: String,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    pub layout: PageLayout,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            export_dir: "dataset".to_string(),
            storage: StorageConfig::default(),
            pagination: PaginationConfig::default(),
            layout: PageLayout::default(),
        }
    }
}

impl HarvestConfig {
    /// Load from a YAML file, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: HarvestConfig = serde_yaml::from_str(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Render the resolved configuration as YAML, for diagnostics.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Where records are stored.
///
/// Both fields are optional here; [`crate::storage::PersistenceGateway::open`]
/// rejects a config with either one missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// A filesystem path, `:memory:`, or an SQLAlchemy-style `sqlite:///path` URL.
    pub database: Option<String>,
    /// Name of the backing table.
    pub table: Option<String>,
}

impl StorageConfig {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            table: Some(table.into()),
        }
    }

    /// Resolve the SQLite location to open.
    pub fn database_path(&self) -> Result<String> {
        let raw = self
            .database
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HarvestError::config("storage location is not set (DATABASE_URL_SQLITE)"))?;

        if raw == "sqlite://" {
            return Ok(":memory:".to_string());
        }
        if let Some(path) = raw.strip_prefix("sqlite:///") {
            return Ok(path.to_string());
        }
        if raw.contains("://") {
            return Err(HarvestError::config(format!(
                "unsupported storage URL '{raw}', expected a path or sqlite:///path"
            )));
        }
        Ok(raw.to_string())
    }

    /// Resolve and validate the table name.
    pub fn table_name(&self) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HarvestError::config("table name is not set (DATABASE_TABLE_SQLITE)"))?;

        let mut chars = table.chars();
        let valid_head = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(HarvestError::config(format!(
                "table name '{table}' must match [A-Za-z_][A-Za-z0-9_]*"
            )));
        }
        Ok(table.to_string())
    }
}

/// Pagination budget and pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Upper bound on "load more" activations.
    pub max_triggers: usize,
    /// Fixed pause after each activation, in milliseconds.
    pub throttle_ms: u64,
    /// How long to wait for the first article container after navigation.
    pub ready_timeout_secs: u64,
    pub headless: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_triggers: 10,
            throttle_ms: 1000,
            ready_timeout_secs: 30,
            headless: true,
        }
    }
}

impl PaginationConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

/// CSS selectors describing the category page markup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageLayout {
    /// Page-level link whose target names the category.
    pub category_marker: String,
    /// One element per article.
    pub article_container: String,
    pub title: String,
    pub date: String,
    pub description: String,
    /// Anchor holding the article's outbound link, scoped to a container.
    pub url_anchor: String,
    /// The "load more" control.
    pub load_more: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            category_marker: "div.EJbGYqFfRQOwX_PmlB2H a".to_string(),
            article_container: "div.TfxplVx3RtbilOD2tqd6".to_string(),
            title: "div.VdsPqrmJYY7F2MNUKOwQ span.S2DdZEgzkqC9bYeTJUGw".to_string(),
            date: "span.date".to_string(),
            description: "div.Hxtmf9GvkV8Ti6V0GUSn".to_string(),
            url_anchor: "div.c80ZAVi5M80kecYskLY3 a".to_string(),
            load_more: "div.QMXJlc3R5MMJjDGSV4Jd".to_string(),
        }
    }
}
