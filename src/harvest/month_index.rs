//! Month index cache
//!
//! The back-issues site only exposes PDF listings at month granularity, so a
//! backward run over one month would otherwise refetch the same index page
//! up to 31 times. The cache memoizes parsed listings per (year, month) for
//! the lifetime of the process; it is never persisted.

use crate::fetch::Fetcher;
use crate::parse::IndexParser;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Memoized month index listings, keyed by (year, month)
pub struct MonthIndexCache<P: IndexParser> {
    base_url: Url,
    parser: P,
    entries: HashMap<(i32, u32), BTreeMap<NaiveDate, String>>,
}

impl<P: IndexParser> MonthIndexCache<P> {
    pub fn new(base_url: Url, parser: P) -> Self {
        Self {
            base_url,
            parser,
            entries: HashMap::new(),
        }
    }

    /// URL of the back-issues page filtered to one month
    fn index_url(&self, year: i32, month: u32) -> String {
        format!(
            "{}/الأعداد-السابقة?monthFilter={}-{:02}",
            self.base_url.as_str().trim_end_matches('/'),
            year,
            month
        )
    }

    /// Returns the issue listing for a month, fetching it on first request.
    ///
    /// A month that lists nothing — or whose index page cannot be fetched —
    /// caches an empty map, so it costs at most one request per run.
    pub async fn listing(
        &mut self,
        fetcher: &mut Fetcher,
        year: i32,
        month: u32,
    ) -> &BTreeMap<NaiveDate, String> {
        let key = (year, month);

        if !self.entries.contains_key(&key) {
            let url = self.index_url(year, month);
            tracing::info!(%url, "Fetching month index");

            let issues = match fetcher.fetch_text(&url).await {
                Ok(html) => {
                    let parsed = self.parser.parse_index(&html);
                    tracing::info!(year, month, count = parsed.len(), "Parsed month index");
                    parsed.into_iter().map(|i| (i.date, i.url)).collect()
                }
                Err(e) => {
                    tracing::warn!(year, month, error = %e, "Month index fetch failed");
                    BTreeMap::new()
                }
            };

            self.entries.insert(key, issues);
        } else {
            tracing::debug!(year, month, "Using cached month index");
        }

        self.entries.entry(key).or_default()
    }

    /// Number of cached months
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
