//! Month index extraction for the daily PDF issues
//!
//! The back-issues page lists one `.pdf-preview` block per published day,
//! each carrying a date label and a link to the PDF asset. The date label is
//! free text around a `YYYY-MM-DD` token, so the token is pulled out with a
//! regex rather than by position.

use crate::parse::{IndexParser, IssueRef};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Concrete [`IndexParser`] for the Aljarida back-issues markup
pub struct IssueIndexParser {
    base_url: Url,
    widget: Selector,
    preview: Selector,
    date_label: Selector,
    link: Selector,
    date_token: Regex,
}

impl IssueIndexParser {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            widget: Selector::parse("div.aljarida-archive-pdf").unwrap(),
            preview: Selector::parse("div.pdf-preview").unwrap(),
            date_label: Selector::parse("div.date").unwrap(),
            link: Selector::parse("a[href]").unwrap(),
            date_token: Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap(),
        }
    }
}

impl IndexParser for IssueIndexParser {
    fn parse_index(&self, html: &str) -> Vec<IssueRef> {
        let document = Html::parse_document(html);

        let Some(widget) = document.select(&self.widget).next() else {
            return Vec::new();
        };

        let mut issues = Vec::new();
        for preview in widget.select(&self.preview) {
            let Some(label) = preview.select(&self.date_label).next() else {
                continue;
            };
            let Some(link) = preview.select(&self.link).next() else {
                continue;
            };

            let label_text = label.text().collect::<Vec<_>>().join(" ");
            let Some(token) = self
                .date_token
                .captures(&label_text)
                .and_then(|c| c.get(1))
            else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(token.as_str(), "%Y-%m-%d") else {
                continue;
            };

            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Ok(url) = self.base_url.join(href) else {
                continue;
            };

            issues.push(IssueRef {
                date,
                url: url.to_string(),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> IssueIndexParser {
        IssueIndexParser::new(Url::parse("https://www.aljarida.com").unwrap())
    }

    const INDEX_HTML: &str = r#"
        <div class="aljarida-archive-pdf">
          <div class="pdf-preview">
            <div class="date">النسخة الورقية<br>2026-01-29</div>
            <a href="/pdfs/aljarida-20260129-1.pdf?v=3">Download</a>
          </div>
          <div class="pdf-preview">
            <div class="date">2026-01-28</div>
            <a href="https://cdn.aljarida.com/pdfs/aljarida-20260128-1.pdf">Download</a>
          </div>
          <div class="pdf-preview">
            <div class="date">no date here</div>
            <a href="/pdfs/mystery.pdf">Download</a>
          </div>
        </div>
    "#;

    #[test]
    fn test_parse_index_extracts_dated_issues() {
        let issues = parser().parse_index(INDEX_HTML);
        assert_eq!(issues.len(), 2);

        assert_eq!(issues[0].date, NaiveDate::from_ymd_opt(2026, 1, 29).unwrap());
        assert_eq!(
            issues[0].url,
            "https://www.aljarida.com/pdfs/aljarida-20260129-1.pdf?v=3"
        );

        assert_eq!(issues[1].date, NaiveDate::from_ymd_opt(2026, 1, 28).unwrap());
        assert_eq!(
            issues[1].url,
            "https://cdn.aljarida.com/pdfs/aljarida-20260128-1.pdf"
        );
    }

    #[test]
    fn test_parse_index_without_widget() {
        assert!(parser().parse_index("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_undated_previews_are_skipped() {
        let issues = parser().parse_index(INDEX_HTML);
        assert!(issues.iter().all(|i| !i.url.contains("mystery")));
    }
}
