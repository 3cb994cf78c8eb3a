//! Configuration file loading
//!
//! The format is chosen by extension: `.toml` or `.json`.
//!
//! ```toml
//! [source]
//! domain = "https://www.yuque.com"
//! user_id = "123456"
//! auth = "<token>"
//! sync_repos = ["Guide"]
//! excluded_docs = ["Drafts"]
//!
//! [destination]
//! domain = "https://wiki.example.com"
//! space = "DOCS"
//! auth = "Basic <credentials>"
//! root_page_id = "65537"
//!
//! [notification]
//! url = "https://hooks.example.com/..."
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::source::SourceFilter;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "WIKISYNC_CONFIG";

/// Complete wikisync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Source wiki connection and filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub domain: String,
    pub user_id: String,
    pub auth: String,
    /// Repository titles to synchronize; nothing is synchronized when empty
    #[serde(default)]
    pub sync_repos: Vec<String>,
    /// Document titles excluded together with their subtrees
    #[serde(default)]
    pub excluded_docs: Vec<String>,
}

/// Destination space connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub domain: String,
    pub space: String,
    /// Sent verbatim as the `Authorization` header
    pub auth: String,
    /// Space home page; defaults to the unique page without ancestors
    #[serde(default)]
    pub root_page_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving the end-of-run message
    #[serde(default)]
    pub url: Option<String>,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: Config = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            })?,
            _ => return Err(Error::UnsupportedConfigFormat { extension }),
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// `<user config dir>/wikisync/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wikisync").join("config.toml"))
    }

    /// The explicit path if given, else [`Config::default_path`]
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        Self::default_path().ok_or_else(|| Error::ConfigNotFound {
            path: PathBuf::from("wikisync/config.toml"),
        })
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require_url("source.domain", &self.source.domain)?;
        require("source.user_id", &self.source.user_id)?;
        require("source.auth", &self.source.auth)?;
        require_url("destination.domain", &self.destination.domain)?;
        require("destination.space", &self.destination.space)?;
        require("destination.auth", &self.destination.auth)?;
        if let Some(id) = &self.destination.root_page_id {
            require("destination.root_page_id", id)?;
        }
        if let Some(url) = &self.notification.url {
            require_url("notification.url", url)?;
        }
        Ok(())
    }

    pub fn source_filter(&self) -> SourceFilter {
        SourceFilter {
            sync_repos: self.source.sync_repos.clone(),
            excluded_docs: self.source.excluded_docs.clone(),
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(Error::InvalidConfig {
            field: field.to_string(),
            message: format!("'{value}' is not an http(s) URL"),
        });
    }
    Ok(())
}
