//! Page parsing capabilities
//!
//! The harvest engine never looks at HTML itself. It consumes these traits,
//! and the concrete implementations in this module carry everything specific
//! to the Aljarida page layout (selectors, pagination markup, date formats).
//! Swapping the site means swapping these implementations, nothing else.

mod archive;
mod issues;

pub use archive::ArchiveParser;
pub use issues::IssueIndexParser;

use chrono::NaiveDate;

/// Descriptor of one article discovered on an archive listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    /// Section the article was filed under
    pub category: String,

    /// Article headline
    pub title: String,

    /// Absolute URL of the article page
    pub url: String,
}

/// One parsed archive listing page
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Articles found on this page
    pub articles: Vec<ArticleRef>,

    /// Highest page number advertised by the pagination widget;
    /// 1 when no pagination is present
    pub max_pages: u32,
}

/// A daily PDF issue discovered on a month index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// Publication date of the issue
    pub date: NaiveDate,

    /// Absolute URL of the PDF asset
    pub url: String,
}

/// Parses archive listing pages and article bodies
pub trait ListingParser: Send {
    /// Extracts article descriptors and the pagination ceiling from a
    /// day-archive listing page
    fn parse_listing(&self, html: &str) -> Listing;

    /// Extracts the readable body text of an article page.
    ///
    /// Returns `None` when the page carries no recognizable content node.
    fn parse_article(&self, html: &str) -> Option<String>;
}

/// Parses month index pages enumerating daily PDF issues
pub trait IndexParser: Send {
    /// Extracts all issue descriptors listed on a month index page
    fn parse_index(&self, html: &str) -> Vec<IssueRef>;
}
