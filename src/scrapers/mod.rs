//! Site-specific scrapers.
//!
//! One submodule per watched site. Each scraper turns a raw HTML document
//! into an ordered list of [`crate::models::NewsItem`]s; fetching is the
//! transport layer's job, so scrapers stay pure and testable against fixture
//! documents.
//!
//! # Supported Sites
//!
//! | Site | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | UEC announcements | [`uec`] | HTML scraping | No semantic markup; structural heuristics |

pub mod uec;
