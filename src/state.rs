//! Durable storage for the "last notified announcement" marker.
//!
//! The marker is the URL of the newest item that has already been processed.
//! It is read once at the start of a run and written once at the end of a
//! successful run; a run that fails before extraction leaves it untouched, so
//! the next scheduled invocation retries the same window.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk shape of the persisted marker.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    /// URL of the most recently notified item; empty when none yet.
    last_announcement_url: String,
}

/// Abstraction over the durable marker store.
///
/// An empty marker is modeled as `None`: the next run treats every fetched
/// item as new.
pub trait StateStore {
    /// Read the marker, if one has been recorded.
    async fn load(&self) -> Result<Option<String>>;

    /// Record `url` as the most recently notified item.
    async fn save(&self, url: &str) -> Result<()>;
}

/// Marker store backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store reading and writing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write an empty marker file unless one already exists.
    ///
    /// Used by `--init`; an existing file is left alone so a re-run of the
    /// initialization never erases a live marker.
    pub async fn initialize(&self) -> Result<()> {
        if Path::new(&self.path).exists() {
            debug!(path = %self.path.display(), "State file already present");
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&PersistedState::default())?;
        tokio::fs::write(&self.path, json).await?;
        info!(path = %self.path.display(), "Wrote empty state file");
        Ok(())
    }
}

impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state: PersistedState = serde_json::from_str(&raw)?;
        if state.last_announcement_url.is_empty() {
            Ok(None)
        } else {
            Ok(Some(state.last_announcement_url))
        }
    }

    async fn save(&self, url: &str) -> Result<()> {
        let state = PersistedState {
            last_announcement_url: url.to_string(),
        };
        let json = serde_json::to_string_pretty(&state)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), url, "Persisted marker");
        Ok(())
    }
}
