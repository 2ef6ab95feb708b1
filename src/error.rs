//! Error types shared across the application.
//!
//! Every fallible operation in this crate returns the [`Result`] alias defined
//! here. The variants mirror the failure domains of a run: fetching the
//! announcements page, delivering to Slack, reading or writing the persisted
//! marker, and loading configuration.

use thiserror::Error;

/// The error type for all operations in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The announcements page could not be retrieved.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// The URL that was being fetched.
        url: String,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The Slack API rejected or failed a message delivery.
    #[error("slack delivery failed: {0}")]
    Delivery(String),

    /// The state file could not be read or written.
    #[error("state store error: {0}")]
    State(#[from] std::io::Error),

    /// The configuration file is missing, unreadable, or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON (state file, Slack payload) failed to serialize or deserialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
