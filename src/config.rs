//! YAML configuration loading and one-time initialization.
//!
//! All runtime settings live in a single `config.yaml`: Slack credentials,
//! bot identity, the page to watch, and the scraping heuristics that are
//! site-specific (base origin, relevance path filters). `--init` writes a
//! placeholder file; real deployment overwrites the token and channel ID
//! with live credentials before the first run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use url::Url;

/// Runtime configuration, deserialized from `config.yaml`.
///
/// Every field has a default, so a partial file only needs to override the
/// values that differ from the placeholders (in practice: the token and the
/// channel ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Slack bot token (`xoxb-...`).
    pub slack_token: String,
    /// Slack channel ID (`C...`).
    pub slack_channel_id: String,
    /// Display name the bot posts under.
    pub bot_name: String,
    /// Emoji icon the bot posts with.
    pub bot_icon: String,
    /// The announcements listing page to watch.
    pub page_url: String,
    /// Origin used to resolve relative announcement links.
    pub base_url: String,
    /// An href must contain one of these substrings to count as an
    /// announcement link.
    pub path_filters: Vec<String>,
    /// Minimum delay between successive Slack messages, in milliseconds.
    pub rate_limit_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slack_token: "xoxb-".to_string(),
            slack_channel_id: "C0000000000".to_string(),
            bot_name: "UEC News Bot".to_string(),
            bot_icon: ":uec:".to_string(),
            page_url: "https://www.uec.ac.jp/news/announcement/".to_string(),
            base_url: "https://www.uec.ac.jp".to_string(),
            path_filters: vec!["/news/".to_string(), "/announcement/".to_string()],
            rate_limit_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {path}: {e}")))?;
        let config: Config =
            serde_yaml::from_str(&raw).map_err(|e| Error::Config(format!("{path}: {e}")))?;
        config.base()?;
        Ok(config)
    }

    /// Write a placeholder configuration file for a fresh deployment.
    ///
    /// Refuses to touch an existing file so that live credentials are never
    /// clobbered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file already exists or cannot be
    /// written.
    pub fn write_placeholder(path: &str) -> Result<()> {
        if Path::new(path).exists() {
            return Err(Error::Config(format!("{path} already exists")));
        }
        let yaml = serde_yaml::to_string(&Config::default())
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, yaml)
            .map_err(|e| Error::Config(format!("cannot write {path}: {e}")))?;
        info!(path, "Wrote placeholder configuration");
        Ok(())
    }

    /// The base origin as a parsed [`Url`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not a valid URL.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("base_url {}: {e}", self.base_url)))
    }
}
