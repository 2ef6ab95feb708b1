//! HTTP retrieval of the announcements page.

use crate::error::{Error, Result};
use std::time::Instant;
use tracing::{info, instrument};

/// Transport abstraction for retrieving the raw page HTML.
///
/// The orchestrator is generic over this trait so tests can substitute a
/// canned document or a failing transport.
pub trait Fetch {
    /// Retrieve the document at `url` as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetch`] implementation over a shared [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh client.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .text()
            .await
            .map_err(|e| Error::Fetch {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched announcements page"
        );
        Ok(body)
    }
}
