//! Data models for scraped announcements.
//!
//! The single model here is [`NewsItem`]: one entry scraped from the UEC
//! announcements page, carrying a normalized title, an absolute URL, and the
//! publication date found near the entry in the page markup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One announcement scraped from the news page.
///
/// Items are immutable once constructed. Within one extraction result they
/// are ordered by `date` descending, ties keeping document order.
///
/// # Fields
///
/// * `title` - Visible link text with the leading date token stripped and
///   whitespace runs collapsed to single spaces
/// * `url` - Absolute URL of the announcement
/// * `date` - Publication date taken from a `YYYY.MM.DD` token near the link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Normalized announcement title.
    pub title: String,
    /// Absolute announcement URL.
    pub url: String,
    /// Publication date.
    pub date: NaiveDate,
}

impl NewsItem {
    /// Render the date the way the source page prints it (`YYYY.MM.DD`).
    pub fn date_label(&self) -> String {
        self.date.format("%Y.%m.%d").to_string()
    }
}
