//! Per-date processing
//!
//! A [`DayProcessor`] turns one calendar date into a [`DayReport`]. The two
//! implementations mirror the two harvested streams: the article stream
//! walks the paginated day archive and uploads one rows artifact per day;
//! the issue stream resolves the day's PDF through the month index and
//! uploads the binary.
//!
//! Failure discipline: a broken item never aborts its date, a broken date
//! never aborts the run. Storage trouble during content upload is demoted to
//! a failed date here — only checkpoint persistence, handled by the
//! controller, is allowed to be fatal.

use crate::fetch::Fetcher;
use crate::harvest::MonthIndexCache;
use crate::output::{ArticleRow, RowSink};
use crate::parse::{IndexParser, ListingParser};
use crate::store::{day_key, BlobStore};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use url::Url;

/// Leading bytes every uploaded PDF payload must carry
const PDF_MAGIC: &[u8] = b"%PDF";

/// Outcome of processing one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    /// At least one item was uploaded
    Uploaded,

    /// The destination already holds this date's content
    SkippedExisting,

    /// The site lists nothing for this date
    SkippedNoContent,

    /// Every attempted item failed
    Failed(String),
}

/// Item-granular accounting for one processed date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub outcome: DayOutcome,
    pub uploaded: u32,
    pub skipped_existing: u32,
    pub failed: u32,
}

impl DayReport {
    /// A report with no item activity, for the skip outcomes
    pub fn outcome_only(outcome: DayOutcome) -> Self {
        Self {
            outcome,
            uploaded: 0,
            skipped_existing: 0,
            failed: 0,
        }
    }
}

/// Processes a single date for one stream
#[async_trait]
pub trait DayProcessor: Send {
    /// Stream identifier, used for checkpoint keys and logging
    fn stream_name(&self) -> &'static str;

    /// Processes one date end to end: resolve items, gate on existing
    /// uploads, fetch, validate, upload. Never mutates the checkpoint.
    async fn process(&mut self, date: NaiveDate) -> crate::Result<DayReport>;
}

/// Existence probe that degrades to "absent" on storage trouble.
///
/// A failing probe must not abort the date: if the store is really down the
/// subsequent upload fails too, the date reports Failed, and a later run
/// retries it.
async fn exists_or_assume_absent(store: &dyn BlobStore, key: &str) -> bool {
    match store.exists(key).await {
        Ok(present) => present,
        Err(e) => {
            tracing::warn!(%key, error = %e, "Existence check failed, assuming absent");
            false
        }
    }
}

// ===== Article stream =====

/// Harvests the article archive for one date into a rows artifact
pub struct ArticleDayProcessor<P: ListingParser, S: RowSink> {
    base_url: Url,
    fetcher: Fetcher,
    parser: P,
    sink: S,
    store: Arc<dyn BlobStore>,
    root: String,
}

impl<P: ListingParser, S: RowSink> ArticleDayProcessor<P, S> {
    pub fn new(
        base_url: Url,
        fetcher: Fetcher,
        parser: P,
        sink: S,
        store: Arc<dyn BlobStore>,
        root: String,
    ) -> Self {
        Self {
            base_url,
            fetcher,
            parser,
            sink,
            store,
            root,
        }
    }

    fn archive_url(&self, date: NaiveDate, page: u32) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if page == 1 {
            format!(
                "{}/archive/{}/{}/{}",
                base,
                date.year(),
                date.month(),
                date.day()
            )
        } else {
            format!(
                "{}/archive/{}/{}/{}?pgno={}",
                base,
                date.year(),
                date.month(),
                date.day(),
                page
            )
        }
    }
}

#[async_trait]
impl<P: ListingParser, S: RowSink> DayProcessor for ArticleDayProcessor<P, S> {
    fn stream_name(&self) -> &'static str {
        "articles"
    }

    async fn process(&mut self, date: NaiveDate) -> crate::Result<DayReport> {
        let key = day_key(&self.root, date, self.sink.artifact_name());

        // Idempotence gate before any network traffic: the day artifact key
        // is deterministic, so an already-harvested day costs zero requests.
        if exists_or_assume_absent(self.store.as_ref(), &key).await {
            tracing::info!(%date, %key, "Day artifact already uploaded, skipping");
            return Ok(DayReport {
                outcome: DayOutcome::SkippedExisting,
                uploaded: 0,
                skipped_existing: 1,
                failed: 0,
            });
        }

        // Page 1 carries the pagination ceiling; without it the date cannot
        // be enumerated at all.
        let first_url = self.archive_url(date, 1);
        let first_page = match self.fetcher.fetch_text(&first_url).await {
            Ok(html) => html,
            Err(e) => {
                return Ok(DayReport {
                    outcome: DayOutcome::Failed(format!("archive listing unavailable: {}", e)),
                    uploaded: 0,
                    skipped_existing: 0,
                    failed: 1,
                });
            }
        };

        let listing = self.parser.parse_listing(&first_page);
        let mut articles = listing.articles;

        if listing.max_pages > 1 {
            tracing::info!(%date, pages = listing.max_pages, "Archive day is paginated");
        }
        for page in 2..=listing.max_pages {
            let page_url = self.archive_url(date, page);
            match self.fetcher.fetch_text(&page_url).await {
                Ok(html) => articles.extend(self.parser.parse_listing(&html).articles),
                Err(e) => {
                    tracing::warn!(%date, page, error = %e, "Listing page failed, continuing");
                }
            }
        }

        if articles.is_empty() {
            tracing::info!(%date, "No articles listed");
            return Ok(DayReport::outcome_only(DayOutcome::SkippedNoContent));
        }

        tracing::info!(%date, count = articles.len(), "Fetching article bodies");

        let mut rows = Vec::new();
        let mut failed = 0u32;
        for article in &articles {
            match self.fetcher.fetch_text(&article.url).await {
                Ok(html) => match self.parser.parse_article(&html) {
                    Some(content) => rows.push(ArticleRow {
                        category: article.category.clone(),
                        title: article.title.clone(),
                        content,
                    }),
                    None => {
                        tracing::warn!(url = %article.url, "Article page had no content");
                        failed += 1;
                    }
                },
                Err(e) => {
                    tracing::warn!(url = %article.url, error = %e, "Article fetch failed");
                    failed += 1;
                }
            }
        }

        if rows.is_empty() {
            return Ok(DayReport {
                outcome: DayOutcome::Failed("every listed article failed".to_string()),
                uploaded: 0,
                skipped_existing: 0,
                failed,
            });
        }

        let bytes = match self.sink.write(&rows) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(DayReport {
                    outcome: DayOutcome::Failed(format!("row serialization failed: {}", e)),
                    uploaded: 0,
                    skipped_existing: 0,
                    failed: failed + rows.len() as u32,
                });
            }
        };

        match self
            .store
            .put(&key, &bytes, self.sink.content_type())
            .await
        {
            Ok(()) => {
                tracing::info!(%date, %key, rows = rows.len(), "Uploaded day artifact");
                Ok(DayReport {
                    outcome: DayOutcome::Uploaded,
                    uploaded: rows.len() as u32,
                    skipped_existing: 0,
                    failed,
                })
            }
            Err(e) => Ok(DayReport {
                outcome: DayOutcome::Failed(format!("upload failed: {}", e)),
                uploaded: 0,
                skipped_existing: 0,
                failed: failed + rows.len() as u32,
            }),
        }
    }
}

// ===== Issue (PDF) stream =====

/// Harvests the daily PDF issue for one date via the month index
pub struct IssueDayProcessor<P: IndexParser> {
    fetcher: Fetcher,
    index: MonthIndexCache<P>,
    store: Arc<dyn BlobStore>,
    root: String,
}

impl<P: IndexParser> IssueDayProcessor<P> {
    pub fn new(
        fetcher: Fetcher,
        index: MonthIndexCache<P>,
        store: Arc<dyn BlobStore>,
        root: String,
    ) -> Self {
        Self {
            fetcher,
            index,
            store,
            root,
        }
    }
}

#[async_trait]
impl<P: IndexParser> DayProcessor for IssueDayProcessor<P> {
    fn stream_name(&self) -> &'static str {
        "pdf"
    }

    async fn process(&mut self, date: NaiveDate) -> crate::Result<DayReport> {
        let listing = self
            .index
            .listing(&mut self.fetcher, date.year(), date.month())
            .await;

        let Some(pdf_url) = listing.get(&date).cloned() else {
            tracing::info!(%date, "No issue listed for this date");
            return Ok(DayReport::outcome_only(DayOutcome::SkippedNoContent));
        };

        let artifact = format!("magazinepdf/{}", issue_filename(&pdf_url, date));
        let key = day_key(&self.root, date, &artifact);

        if exists_or_assume_absent(self.store.as_ref(), &key).await {
            tracing::info!(%date, %key, "Issue already uploaded, skipping");
            return Ok(DayReport {
                outcome: DayOutcome::SkippedExisting,
                uploaded: 0,
                skipped_existing: 1,
                failed: 0,
            });
        }

        tracing::info!(%date, url = %pdf_url, "Downloading issue");
        let payload = match self.fetcher.fetch(&pdf_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(DayReport {
                    outcome: DayOutcome::Failed(format!("issue download failed: {}", e)),
                    uploaded: 0,
                    skipped_existing: 0,
                    failed: 1,
                });
            }
        };

        if !is_valid_pdf(&payload) {
            tracing::warn!(%date, url = %pdf_url, bytes = payload.len(), "Payload is not a PDF, discarding");
            return Ok(DayReport {
                outcome: DayOutcome::Failed("payload failed PDF validation".to_string()),
                uploaded: 0,
                skipped_existing: 0,
                failed: 1,
            });
        }

        match self.store.put(&key, &payload, "application/pdf").await {
            Ok(()) => {
                tracing::info!(%date, %key, bytes = payload.len(), "Uploaded issue");
                Ok(DayReport {
                    outcome: DayOutcome::Uploaded,
                    uploaded: 1,
                    skipped_existing: 0,
                    failed: 0,
                })
            }
            Err(e) => Ok(DayReport {
                outcome: DayOutcome::Failed(format!("upload failed: {}", e)),
                uploaded: 0,
                skipped_existing: 0,
                failed: 1,
            }),
        }
    }
}

/// Validates that a payload is plausibly a PDF: non-empty and carrying the
/// `%PDF` magic prefix
fn is_valid_pdf(payload: &[u8]) -> bool {
    !payload.is_empty() && payload.starts_with(PDF_MAGIC)
}

/// Derives the stored file name for an issue from its URL.
///
/// Uses the URL path's base name with any query string dropped; falls back
/// to a synthetic date-stamped name when the URL does not end in a usable
/// `.pdf` segment.
fn issue_filename(pdf_url: &str, date: NaiveDate) -> String {
    let from_path = Url::parse(pdf_url).ok().and_then(|url| {
        url.path_segments()
            .and_then(|segments| segments.last().map(|s| s.to_string()))
            .filter(|name| name.ends_with(".pdf"))
    });

    from_path.unwrap_or_else(|| {
        format!(
            "aljarida-{}{:02}{:02}-1.pdf",
            date.year(),
            date.month(),
            date.day()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_is_valid_pdf() {
        assert!(is_valid_pdf(b"%PDF-1.7 rest of file"));
        assert!(!is_valid_pdf(b""));
        assert!(!is_valid_pdf(b"<html>Not Found</html>"));
    }

    #[test]
    fn test_issue_filename_from_url_path() {
        assert_eq!(
            issue_filename(
                "https://cdn.aljarida.com/pdfs/aljarida-20260129-1.pdf",
                d(2026, 1, 29)
            ),
            "aljarida-20260129-1.pdf"
        );
    }

    #[test]
    fn test_issue_filename_strips_query() {
        assert_eq!(
            issue_filename(
                "https://cdn.aljarida.com/pdfs/aljarida-20260129-1.pdf?v=3",
                d(2026, 1, 29)
            ),
            "aljarida-20260129-1.pdf"
        );
    }

    #[test]
    fn test_issue_filename_fallback() {
        assert_eq!(
            issue_filename("https://www.aljarida.com/viewer?id=99", d(2026, 1, 29)),
            "aljarida-20260129-1.pdf"
        );
    }
}
