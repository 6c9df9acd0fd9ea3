// src/services/listing.rs

//! Listing page discovery.
//!
//! Enumerates post links on one listing page, resolves each link's date
//! fragment, and classifies entries against the crawl window. Listings are
//! rendered newest-first, so the first entry older than the window start is
//! the signal that every later page is older still.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlWindow, ListingEntry};
use crate::services::dates;
use crate::services::selectors::SelectorChain;
use crate::utils::{element_text, resolve_url};

/// Post-link candidates, board-template specific first.
const LINK_CANDIDATES: [&str; 3] = [
    ".article-board.m-tcol-c:not(#upperArticleList) .article",
    ".article",
    "a[href*='/articles/']",
];

/// Date-shaped descendants, queried while walking up from a post link.
const DATE_CANDIDATES: [&str; 3] = [".td_date", "[class*='date']", "[class*='Date']"];

/// Ancestor levels searched for a date fragment.
const DATE_SEARCH_DEPTH: usize = 5;

/// Canonical article link inside a non-anchor post element.
const ARTICLE_LINK: &str = "a[href*='/articles/']";

/// Outcome of scanning one listing page.
#[derive(Debug, Default)]
pub struct PageDiscovery {
    /// Entries whose date falls inside the window, in page order
    pub entries: Vec<ListingEntry>,

    /// An entry older than the window was seen; later pages are older still
    pub stop_after_page: bool,

    /// Entries dropped because their date text would not parse
    pub dates_unparsed: usize,
}

/// Scanner for board listing pages.
pub struct ListingScanner {
    links: SelectorChain,
    date_fragments: SelectorChain,
    article_link: Selector,
}

impl ListingScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            links: SelectorChain::new("post link", &LINK_CANDIDATES)?,
            date_fragments: SelectorChain::new("post date", &DATE_CANDIDATES)?,
            article_link: Selector::parse(ARTICLE_LINK)
                .map_err(|e| AppError::selector(ARTICLE_LINK, format!("{e:?}")))?,
        })
    }

    /// Scan one listing page against the window.
    pub fn discover(
        &self,
        document: &Html,
        base: &Url,
        window: &CrawlWindow,
        now: NaiveDateTime,
    ) -> PageDiscovery {
        let mut discovery = PageDiscovery::default();

        let posts = self.links.resolve_all(document.root_element());
        if posts.is_empty() {
            log::debug!("no post links resolved on this page");
            return discovery;
        }
        log::debug!("{} post element(s) found", posts.len());

        for post in posts {
            let Some(href) = self.post_href(&post, base) else {
                continue;
            };

            let Some(date_text) = self.date_text_near(&post) else {
                log::debug!("no date fragment near {href}");
                continue;
            };

            let Some(date) = dates::interpret(&date_text, now) else {
                log::debug!("unreadable date '{}' for {href}", date_text.trim());
                discovery.dates_unparsed += 1;
                continue;
            };

            if window.is_past(date.date()) {
                // Older than the window on a newest-first listing: everything
                // after this point has aged out too.
                log::info!(
                    "reached {} (before window start), stopping after this page",
                    date.date()
                );
                discovery.stop_after_page = true;
                break;
            }

            if window.contains(date.date()) {
                log::info!("collecting {} ({})", href, date.date());
                discovery.entries.push(ListingEntry { url: href, date });
            } else {
                log::debug!("{} is past the window end, skipped", date.date());
            }
        }

        discovery
    }

    /// Canonical article href for a post element: the element itself when it
    /// is a link, otherwise its first article link descendant.
    fn post_href(&self, post: &ElementRef, base: &Url) -> Option<String> {
        let href = if post.value().name() == "a" {
            post.value().attr("href")
        } else {
            post.select(&self.article_link)
                .next()
                .and_then(|a| a.value().attr("href"))
        }?;

        if !href.contains("/articles/") {
            return None;
        }
        Some(resolve_url(base, href))
    }

    /// Walk up a bounded number of ancestors looking for date-shaped text.
    fn date_text_near(&self, post: &ElementRef) -> Option<String> {
        let mut node = post.parent();
        for _ in 0..DATE_SEARCH_DEPTH {
            let ancestor = node.and_then(ElementRef::wrap)?;
            if let Some(found) = self
                .date_fragments
                .resolve_where(ancestor, |el| !element_text(el).is_empty())
            {
                return Some(element_text(&found));
            }
            node = ancestor.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn window() -> CrawlWindow {
        CrawlWindow::new(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(),
        )
        .unwrap()
    }

    fn base() -> Url {
        Url::parse("https://cafe.naver.com").unwrap()
    }

    fn row(article: u32, date: &str) -> String {
        format!(
            r#"<tr>
                <td class="td_article"><a class="article" href="/f-e/cafes/123/articles/{article}">post {article}</a></td>
                <td class="td_date">{date}</td>
            </tr>"#
        )
    }

    fn board(rows: &[String]) -> Html {
        Html::parse_document(&format!(
            r#"<div class="article-board m-tcol-c"><table><tbody>{}</tbody></table></div>"#,
            rows.join("")
        ))
    }

    #[test]
    fn entries_inside_window_are_collected_in_page_order() {
        let scanner = ListingScanner::new().unwrap();
        let page = board(&[row(1, "2025.10.06."), row(2, "2025.10.05."), row(3, "2025.10.03.")]);

        let discovery = scanner.discover(&page, &base(), &window(), reference());

        assert!(!discovery.stop_after_page);
        assert_eq!(discovery.entries.len(), 3);
        assert_eq!(
            discovery.entries[0].url,
            "https://cafe.naver.com/f-e/cafes/123/articles/1"
        );
        assert_eq!(
            discovery.entries[2].date.date(),
            NaiveDate::from_ymd_opt(2025, 10, 3).unwrap()
        );
    }

    #[test]
    fn entry_before_window_stops_the_page_and_the_crawl() {
        let scanner = ListingScanner::new().unwrap();
        let page = board(&[
            row(1, "2025.10.06."),
            row(2, "2025.10.05."),
            row(3, "2025.10.03."),
            row(4, "2025.09.29."),
            // Must never be reached: scanning halts at the older entry.
            row(5, "2025.10.04."),
        ]);

        let discovery = scanner.discover(&page, &base(), &window(), reference());

        assert!(discovery.stop_after_page);
        assert_eq!(discovery.entries.len(), 3);
    }

    #[test]
    fn entry_after_window_is_skipped_without_stopping() {
        let scanner = ListingScanner::new().unwrap();
        let page = board(&[row(1, "2025.10.07."), row(2, "2025.10.05.")]);

        let discovery = scanner.discover(
            &page,
            &base(),
            &CrawlWindow::new(
                NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(),
            )
            .unwrap(),
            reference(),
        );

        assert!(!discovery.stop_after_page);
        assert_eq!(discovery.entries.len(), 1);
        assert_eq!(
            discovery.entries[0].url,
            "https://cafe.naver.com/f-e/cafes/123/articles/2"
        );
    }

    #[test]
    fn unreadable_date_is_a_skip_not_a_stop() {
        let scanner = ListingScanner::new().unwrap();
        let page = board(&[row(1, "조회수"), row(2, "2025.10.05.")]);

        let discovery = scanner.discover(&page, &base(), &window(), reference());

        assert!(!discovery.stop_after_page);
        assert_eq!(discovery.dates_unparsed, 1);
        assert_eq!(discovery.entries.len(), 1);
    }

    #[test]
    fn pinned_list_is_excluded_by_the_specific_candidate() {
        let scanner = ListingScanner::new().unwrap();
        let page = Html::parse_document(&format!(
            r#"
            <div id="upperArticleList" class="article-board m-tcol-c">
                <table><tbody>{}</tbody></table>
            </div>
            <div class="article-board m-tcol-c">
                <table><tbody>{}</tbody></table>
            </div>
            "#,
            row(900, "2025.10.06."),
            row(1, "2025.10.05.")
        ));

        let discovery = scanner.discover(&page, &base(), &window(), reference());

        assert_eq!(discovery.entries.len(), 1);
        assert!(discovery.entries[0].url.ends_with("/articles/1"));
    }

    #[test]
    fn generic_link_fallback_covers_unknown_templates() {
        let scanner = ListingScanner::new().unwrap();
        let page = Html::parse_document(
            r#"
            <ul>
                <li>
                    <a href="https://cafe.naver.com/f-e/cafes/123/articles/777">some post</a>
                    <span class="date-info">2025.10.04.</span>
                </li>
            </ul>
            "#,
        );

        let discovery = scanner.discover(&page, &base(), &window(), reference());

        assert_eq!(discovery.entries.len(), 1);
        assert_eq!(
            discovery.entries[0].url,
            "https://cafe.naver.com/f-e/cafes/123/articles/777"
        );
    }

    #[test]
    fn link_without_article_segment_is_ignored() {
        let scanner = ListingScanner::new().unwrap();
        let page = Html::parse_document(
            r#"
            <div class="article-board m-tcol-c">
                <table><tbody><tr>
                    <td><a class="article" href="/f-e/cafes/123/menus/42">menu link</a></td>
                    <td class="td_date">2025.10.05.</td>
                </tr></tbody></table>
            </div>
            "#,
        );

        let discovery = scanner.discover(&page, &base(), &window(), reference());
        assert!(discovery.entries.is_empty());
    }

    #[test]
    fn entry_without_a_date_fragment_is_skipped() {
        let scanner = ListingScanner::new().unwrap();
        let page = Html::parse_document(
            r#"
            <div class="article-board m-tcol-c">
                <table><tbody><tr>
                    <td><a class="article" href="/f-e/cafes/123/articles/5">dateless</a></td>
                </tr></tbody></table>
            </div>
            "#,
        );

        let discovery = scanner.discover(&page, &base(), &window(), reference());
        assert!(discovery.entries.is_empty());
        assert_eq!(discovery.dates_unparsed, 0);
    }
}
