//! Archive listing and article body extraction for the Aljarida layout
//!
//! The day archive is a paginated table inside `.aljarida-archive-widget`;
//! each row holds a section cell and a linked headline. Article pages carry
//! their text in `.articleContent`, interleaved with ad blocks that must be
//! dropped before the text is usable.

use crate::parse::{ArticleRef, Listing, ListingParser};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Concrete [`ListingParser`] for the Aljarida archive markup
pub struct ArchiveParser {
    base_url: Url,
    widget: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
    pager: Selector,
    content: Selector,
    squeeze_newlines: Regex,
}

impl ArchiveParser {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            widget: Selector::parse("div.aljarida-archive-widget table").unwrap(),
            row: Selector::parse("tr").unwrap(),
            cell: Selector::parse("td").unwrap(),
            link: Selector::parse("a").unwrap(),
            pager: Selector::parse("nav.pagination li.pager-nav a").unwrap(),
            content: Selector::parse("div.articleContent").unwrap(),
            squeeze_newlines: Regex::new(r"\n{3,}").unwrap(),
        }
    }

    /// Reads the pagination widget and returns the highest advertised page
    /// number, defaulting to 1
    fn max_pages(&self, document: &Html) -> u32 {
        document
            .select(&self.pager)
            .filter_map(|a| {
                let text: String = a.text().collect::<String>().trim().to_string();
                text.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(1)
    }
}

impl ListingParser for ArchiveParser {
    fn parse_listing(&self, html: &str) -> Listing {
        let document = Html::parse_document(html);
        let max_pages = self.max_pages(&document);

        let mut articles = Vec::new();
        if let Some(table) = document.select(&self.widget).next() {
            // First row is the table header.
            for row in table.select(&self.row).skip(1) {
                let cells: Vec<ElementRef> = row.select(&self.cell).collect();
                if cells.len() < 2 {
                    continue;
                }

                let category = cells[0].text().collect::<String>().trim().to_string();
                let Some(link) = cells[1].select(&self.link).next() else {
                    continue;
                };
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                let Ok(url) = self.base_url.join(href) else {
                    continue;
                };

                let title = link
                    .value()
                    .attr("title")
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| link.text().collect::<String>().trim().to_string());

                articles.push(ArticleRef {
                    category,
                    title,
                    url: url.to_string(),
                });
            }
        }

        Listing {
            articles,
            max_pages,
        }
    }

    fn parse_article(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let content = document.select(&self.content).next()?;

        let mut text = String::new();
        collect_text(content, &mut text);

        let text = self
            .squeeze_newlines
            .replace_all(text.trim(), "\n\n")
            .into_owned();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Collects descendant text, skipping scripts and in-article ad blocks
fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                let trimmed = t.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                    out.push('\n');
                }
            }
            Node::Element(el) => {
                if el.name() == "script" {
                    continue;
                }
                let is_ad = el
                    .attr("class")
                    .map(|c| c.split_whitespace().any(|name| name == "adInWidget"))
                    .unwrap_or(false);
                if is_ad {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ArchiveParser {
        ArchiveParser::new(Url::parse("https://www.aljarida.com").unwrap())
    }

    const LISTING_HTML: &str = r#"
        <html><body>
        <nav class="pagination">
          <li class="pager-nav"><a href="?pgno=1">1</a></li>
          <li class="pager-nav"><a href="?pgno=2">2</a></li>
          <li class="pager-nav"><a href="?pgno=3">3</a></li>
          <li class="pager-nav"><a href="?pgno=2">Next</a></li>
        </nav>
        <div class="aljarida-archive-widget">
          <table>
            <tr><th>Section</th><th>Headline</th></tr>
            <tr>
              <td>Politics</td>
              <td><a href="/news/politics/1234" title="Council session">Council session</a></td>
            </tr>
            <tr>
              <td>Economy</td>
              <td><a href="https://www.aljarida.com/news/economy/5678">Oil prices</a></td>
            </tr>
            <tr><td>malformed row</td></tr>
          </table>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_extracts_rows() {
        let listing = parser().parse_listing(LISTING_HTML);
        assert_eq!(listing.articles.len(), 2);

        assert_eq!(listing.articles[0].category, "Politics");
        assert_eq!(listing.articles[0].title, "Council session");
        assert_eq!(
            listing.articles[0].url,
            "https://www.aljarida.com/news/politics/1234"
        );

        assert_eq!(listing.articles[1].category, "Economy");
        assert_eq!(listing.articles[1].title, "Oil prices");
    }

    #[test]
    fn test_parse_listing_reads_pagination_ceiling() {
        let listing = parser().parse_listing(LISTING_HTML);
        assert_eq!(listing.max_pages, 3);
    }

    #[test]
    fn test_parse_listing_without_widget() {
        let listing = parser().parse_listing("<html><body><p>nothing here</p></body></html>");
        assert!(listing.articles.is_empty());
        assert_eq!(listing.max_pages, 1);
    }

    #[test]
    fn test_parse_article_skips_ads_and_scripts() {
        let html = r#"
            <div class="articleContent">
              <p>First paragraph.</p>
              <div class="adInWidget"><p>BUY NOW</p></div>
              <script>track();</script>
              <p>Second paragraph.</p>
            </div>
        "#;
        let text = parser().parse_article(html).unwrap();
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        assert!(!text.contains("BUY NOW"));
        assert!(!text.contains("track()"));
    }

    #[test]
    fn test_parse_article_without_content_node() {
        assert_eq!(parser().parse_article("<div>no article here</div>"), None);
    }
}
