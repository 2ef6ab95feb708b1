//! UEC announcements page scraper.
//!
//! The listing at <https://www.uec.ac.jp/news/announcement/> carries no
//! semantic markup for its news list, so extraction is heuristic: every
//! anchor is a candidate, a publication date is searched for in the markup
//! near it, and anchors without a date or without an announcement-looking
//! href are dropped.
//!
//! # Date Resolution
//!
//! The date for an anchor is resolved by an ordered list of [`DateProbe`]s,
//! first match wins:
//!
//! 1. [`PrevSibling`] - text of the nearest preceding element sibling
//!    (e.g. a `<span>` holding the date)
//! 2. [`ParentPrevSibling`] - text of the parent's nearest preceding element
//!    sibling (e.g. `<dt>date</dt><dd><a/></dd>` lists)
//! 3. [`EnclosingBlock`] - full text of the closest `div`/`p`/`li` ancestor
//!
//! The probe list is open: tests and future site layouts can supply their
//! own via [`Extractor::with_probes`].

use crate::config::Config;
use crate::error::Result;
use crate::models::NewsItem;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// A `YYYY.MM.DD` token anywhere in a text run.
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\.\d{2}\.\d{2}").unwrap());

/// A date token at the start of a title, plus the whitespace after it.
static LEADING_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}\.\d{2}\.\d{2}\s*").unwrap());

/// Any run of whitespace, for collapsing multi-line link text.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Ancestor tags treated as text-grouping boundaries when probing for dates.
const BLOCK_TAGS: &[&str] = &["div", "p", "li"];

/// A strategy for finding a publication date in the markup near an anchor.
pub trait DateProbe: Send + Sync {
    /// Probe name, used in logs.
    fn name(&self) -> &'static str;

    /// Return the first `YYYY.MM.DD` token this strategy can see, if any.
    fn probe(&self, anchor: &ElementRef) -> Option<String>;
}

/// Looks at the anchor's nearest preceding element sibling.
pub struct PrevSibling;

impl DateProbe for PrevSibling {
    fn name(&self) -> &'static str {
        "prev_sibling"
    }

    fn probe(&self, anchor: &ElementRef) -> Option<String> {
        let sibling = anchor.prev_siblings().find_map(ElementRef::wrap)?;
        first_date_token(&sibling.text().collect::<String>())
    }
}

/// Looks at the anchor's parent's nearest preceding element sibling.
pub struct ParentPrevSibling;

impl DateProbe for ParentPrevSibling {
    fn name(&self) -> &'static str {
        "parent_prev_sibling"
    }

    fn probe(&self, anchor: &ElementRef) -> Option<String> {
        let parent = anchor.parent()?;
        let sibling = parent.prev_siblings().find_map(ElementRef::wrap)?;
        first_date_token(&sibling.text().collect::<String>())
    }
}

/// Looks at the full text of the closest block-level ancestor.
pub struct EnclosingBlock;

impl DateProbe for EnclosingBlock {
    fn name(&self) -> &'static str {
        "enclosing_block"
    }

    fn probe(&self, anchor: &ElementRef) -> Option<String> {
        let block = anchor.ancestors().find_map(|node| {
            ElementRef::wrap(node).filter(|el| BLOCK_TAGS.contains(&el.value().name()))
        })?;
        first_date_token(&block.text().collect::<String>())
    }
}

/// The probe order used against the live page.
fn default_probes() -> Vec<Box<dyn DateProbe>> {
    vec![
        Box::new(PrevSibling),
        Box::new(ParentPrevSibling),
        Box::new(EnclosingBlock),
    ]
}

/// Heuristic extractor for the announcements listing.
pub struct Extractor {
    base: Url,
    path_filters: Vec<String>,
    probes: Vec<Box<dyn DateProbe>>,
}

impl Extractor {
    /// Create an extractor resolving links against `base` and keeping only
    /// hrefs containing one of `path_filters`.
    pub fn new(base: Url, path_filters: Vec<String>) -> Self {
        Self {
            base,
            path_filters,
            probes: default_probes(),
        }
    }

    /// Build an extractor from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if the configured base URL is
    /// invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.base()?, config.path_filters.clone()))
    }

    /// Replace the date probe list.
    pub fn with_probes(mut self, probes: Vec<Box<dyn DateProbe>>) -> Self {
        self.probes = probes;
        self
    }

    /// Parse `html` into news items, sorted by date descending.
    ///
    /// Anchors without a usable title, without a nearby date, or whose href
    /// fails the relevance filter are skipped silently. An empty result is a
    /// valid outcome, not an error; malformed HTML is recovered leniently by
    /// the parser and never fails.
    pub fn extract(&self, html: &str) -> Vec<NewsItem> {
        let document = Html::parse_document(html);
        let anchor_selector = Selector::parse("a[href]").unwrap();

        let mut items = Vec::new();
        for anchor in document.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(title) = normalize_title(&anchor.text().collect::<String>()) else {
                continue;
            };
            let Some(date) = self.probe_date(&anchor) else {
                continue;
            };
            if !self.is_relevant(href) {
                continue;
            }
            let Some(url) = self.absolute_url(href) else {
                continue;
            };
            items.push(NewsItem { title, url, date });
        }

        // Stable: items sharing a date keep document order.
        items.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(count = items.len(), "Extracted news items");
        items
    }

    /// Run the probes in order; the first token that is a real calendar date
    /// wins. A token that matches the pattern but not the calendar (e.g.
    /// `2024.13.99`) is treated as not found and the chain continues.
    fn probe_date(&self, anchor: &ElementRef) -> Option<NaiveDate> {
        self.probes.iter().find_map(|probe| {
            let token = probe.probe(anchor)?;
            match NaiveDate::parse_from_str(&token, "%Y.%m.%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    debug!(probe = probe.name(), %token, "Date token is not a calendar date");
                    None
                }
            }
        })
    }

    /// Navigation, social, and in-page anchor links don't look like
    /// announcements; only hrefs containing a configured path survive.
    fn is_relevant(&self, href: &str) -> bool {
        self.path_filters.iter().any(|p| href.contains(p.as_str()))
    }

    /// Resolve `href` against the base origin; absolute hrefs pass through.
    fn absolute_url(&self, href: &str) -> Option<String> {
        self.base.join(href).ok().map(Into::into)
    }
}

/// Trim, strip one leading date token, and collapse whitespace runs.
/// Returns `None` when nothing readable remains.
fn normalize_title(raw: &str) -> Option<String> {
    let stripped = LEADING_DATE.replace(raw.trim(), "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    let title = collapsed.trim().to_string();
    if title.is_empty() { None } else { Some(title) }
}

/// First `YYYY.MM.DD` token in `text`.
fn first_date_token(text: &str) -> Option<String> {
    DATE_TOKEN.find(text).map(|m| m.as_str().to_string())
}
