//! Change detection and notification orchestration.
//!
//! One [`Notifier::run`] call is one complete check: fetch the page, extract
//! the item list, diff it against the persisted marker, deliver the new items
//! oldest-first, and persist the new marker. Runs are serialized by the host
//! scheduler; nothing here guards against overlapping invocations.
//!
//! Any failure inside a run is caught at the top: the run logs it, makes one
//! best-effort attempt to post an error notice to the sink, and ends
//! normally. Retry is the next scheduled invocation's job.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::models::NewsItem;
use crate::scrapers::uec::Extractor;
use crate::slack::Notify;
use crate::state::StateStore;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Prefix of the best-effort error notification posted when a run fails.
const ERROR_NOTICE_PREFIX: &str = "ニュースの確認中にエラーが発生しました: ";

/// Slack text for one new announcement.
fn format_message(item: &NewsItem) -> String {
    format!(
        "【新着ニュース】\nタイトル: {}\nURL: {}\n日付: {}",
        item.title,
        item.url,
        item.date_label()
    )
}

/// Orchestrates one fetch, extract, diff, notify, persist cycle.
///
/// Generic over its collaborators so tests can run against canned pages,
/// recording sinks, and in-memory state.
pub struct Notifier<F, N, S> {
    fetcher: F,
    sink: N,
    state: S,
    extractor: Extractor,
    page_url: String,
    delay: Duration,
}

impl<F, N, S> Notifier<F, N, S>
where
    F: Fetch,
    N: Notify,
    S: StateStore,
{
    /// Wire up a notifier from the loaded configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if the configured base URL is
    /// invalid.
    pub fn new(config: &Config, fetcher: F, sink: N, state: S) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::from_config(config)?,
            page_url: config.page_url.clone(),
            delay: Duration::from_millis(config.rate_limit_ms),
            fetcher,
            sink,
            state,
        })
    }

    /// One complete check-and-notify run.
    ///
    /// Never fails: errors are logged and turned into a single best-effort
    /// error notice through the sink. A failure of that notice is itself
    /// logged and swallowed.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) {
        if let Err(e) = self.check_and_notify().await {
            error!(error = %e, "Run failed");
            let notice = format!("{ERROR_NOTICE_PREFIX}{e}");
            if let Err(send_err) = self.sink.send(&notice).await {
                warn!(error = %send_err, "Error notice could not be delivered");
            }
        }
    }

    /// The fallible body of a run.
    async fn check_and_notify(&self) -> Result<()> {
        let marker = self.state.load().await?;
        let html = self.fetcher.fetch(&self.page_url).await?;
        let items = self.extractor.extract(&html);

        if items.is_empty() {
            info!("No news items found on the page");
            return Ok(());
        }

        // Newest-first scan: everything before the marker is new; the marker
        // item and everything after it has already been notified. An absent
        // or never-matching marker makes the whole list new.
        let fresh: Vec<&NewsItem> = items
            .iter()
            .take_while(|item| marker.as_deref() != Some(item.url.as_str()))
            .collect();

        if fresh.is_empty() {
            info!("No new announcements");
        } else {
            for (i, item) in fresh.iter().rev().enumerate() {
                if i > 0 {
                    // Slack rate limit: pace successive messages.
                    sleep(self.delay).await;
                }
                self.sink.send(&format_message(item)).await?;
            }
            info!(count = fresh.len(), "Notified new announcements");
        }

        // Runs for both outcomes above; a failure earlier in the run (fetch,
        // parse, delivery) skips this, leaving the old marker for a retry on
        // the next invocation.
        self.state.save(&items[0].url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    const PAGE: &str = r#"
        <dl>
            <dt>2024.05.01</dt>
            <dd><a href="/news/a">2024.05.01 Item A</a></dd>
            <dt>2024.04.30</dt>
            <dd><a href="/news/b">2024.04.30 Item B</a></dd>
        </dl>
    "#;

    const URL_A: &str = "https://www.uec.ac.jp/news/a";
    const URL_B: &str = "https://www.uec.ac.jp/news/b";

    #[derive(Clone)]
    struct CannedPage(Option<String>);

    impl Fetch for CannedPage {
        async fn fetch(&self, url: &str) -> Result<String> {
            match &self.0 {
                Some(html) => Ok(html.clone()),
                None => Err(Error::Fetch {
                    url: url.to_string(),
                    source: std::io::Error::other("connection refused").into(),
                }),
            }
        }
    }

    /// Records every successful send; fails the attempt at `fail_at`.
    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
        attempts: Arc<Mutex<usize>>,
        fail_at: Option<usize>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notify for RecordingSink {
        async fn send(&self, message: &str) -> Result<()> {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = *attempts;
            *attempts += 1;
            if self.fail_at == Some(attempt) {
                return Err(Error::Delivery("channel_not_found".to_string()));
            }
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryState {
        marker: Arc<Mutex<Option<String>>>,
    }

    impl MemoryState {
        fn with_marker(url: &str) -> Self {
            Self {
                marker: Arc::new(Mutex::new(Some(url.to_string()))),
            }
        }

        fn marker(&self) -> Option<String> {
            self.marker.lock().unwrap().clone()
        }
    }

    impl StateStore for MemoryState {
        async fn load(&self) -> Result<Option<String>> {
            Ok(self.marker())
        }

        async fn save(&self, url: &str) -> Result<()> {
            *self.marker.lock().unwrap() = Some(url.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            rate_limit_ms: 0,
            ..Config::default()
        }
    }

    fn notifier(
        page: Option<&str>,
        sink: &RecordingSink,
        state: &MemoryState,
    ) -> Notifier<CannedPage, RecordingSink, MemoryState> {
        Notifier::new(
            &test_config(),
            CannedPage(page.map(str::to_string)),
            sink.clone(),
            state.clone(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_run_sends_everything_oldest_first() {
        let sink = RecordingSink::default();
        let state = MemoryState::default();

        notifier(Some(PAGE), &sink, &state).run().await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            sent[0],
            format!("【新着ニュース】\nタイトル: Item B\nURL: {URL_B}\n日付: 2024.04.30")
        );
        assert_eq!(
            sent[1],
            format!("【新着ニュース】\nタイトル: Item A\nURL: {URL_A}\n日付: 2024.05.01")
        );
        assert_eq!(state.marker(), Some(URL_A.to_string()));
    }

    #[tokio::test]
    async fn test_marker_at_newest_sends_nothing() {
        let sink = RecordingSink::default();
        let state = MemoryState::with_marker(URL_A);

        notifier(Some(PAGE), &sink, &state).run().await;

        assert!(sink.sent().is_empty());
        assert_eq!(state.marker(), Some(URL_A.to_string()));
    }

    #[tokio::test]
    async fn test_marker_mid_list_sends_only_newer() {
        let sink = RecordingSink::default();
        let state = MemoryState::with_marker(URL_B);

        notifier(Some(PAGE), &sink, &state).run().await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Item A"));
        assert_eq!(state.marker(), Some(URL_A.to_string()));
    }

    #[tokio::test]
    async fn test_stale_marker_treats_everything_as_new() {
        let sink = RecordingSink::default();
        let state = MemoryState::with_marker("https://www.uec.ac.jp/news/rotated-away");

        notifier(Some(PAGE), &sink, &state).run().await;

        assert_eq!(sink.sent().len(), 2);
        assert_eq!(state.marker(), Some(URL_A.to_string()));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let sink = RecordingSink::default();
        let state = MemoryState::default();

        notifier(Some(PAGE), &sink, &state).run().await;
        assert_eq!(sink.sent().len(), 2);

        notifier(Some(PAGE), &sink, &state).run().await;
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_sends_nothing_and_keeps_marker() {
        let sink = RecordingSink::default();
        let state = MemoryState::with_marker(URL_B);

        notifier(Some("<html><body>no links</body></html>"), &sink, &state)
            .run()
            .await;

        assert!(sink.sent().is_empty());
        assert_eq!(state.marker(), Some(URL_B.to_string()));
    }

    #[tokio::test]
    async fn test_fetch_failure_posts_one_error_notice() {
        let sink = RecordingSink::default();
        let state = MemoryState::with_marker(URL_B);

        notifier(None, &sink, &state).run().await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("ニュースの確認中にエラーが発生しました: "));
        assert!(sent[0].contains("connection refused"));
        assert_eq!(state.marker(), Some(URL_B.to_string()));
    }

    #[tokio::test]
    async fn test_delivery_failure_aborts_rest_and_keeps_marker() {
        let sink = RecordingSink {
            fail_at: Some(1),
            ..RecordingSink::default()
        };
        let state = MemoryState::default();

        notifier(Some(PAGE), &sink, &state).run().await;

        let sent = sink.sent();
        // Oldest item went out, the second attempt failed, and the run's
        // catch posted the error notice; the marker write was skipped.
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("Item B"));
        assert!(sent[1].starts_with("ニュースの確認中にエラーが発生しました: "));
        assert_eq!(state.marker(), None);
    }

    #[test]
    fn test_format_message() {
        let item = NewsItem {
            title: "Item A".to_string(),
            url: URL_A.to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        assert_eq!(
            format_message(&item),
            format!("【新着ニュース】\nタイトル: Item A\nURL: {URL_A}\n日付: 2024.05.01")
        );
    }
}
