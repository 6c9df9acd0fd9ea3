//! Utility functions and helpers.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the post number from a canonical article URL.
///
/// The identifier is the digits of the `/articles/{id}` path segment.
pub fn extract_post_number(url: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"/articles/(\d+)").expect("valid pattern"));

    pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Collect an element's text content, whitespace-normalized.
pub fn element_text(element: &scraper::ElementRef) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://cafe.naver.com/f-e/cafes/123/").unwrap();
        assert_eq!(
            resolve_url(&base, "articles/456"),
            "https://cafe.naver.com/f-e/cafes/123/articles/456"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_extract_post_number() {
        assert_eq!(
            extract_post_number("https://cafe.naver.com/f-e/cafes/123/articles/4567?boardtype=L"),
            Some("4567".to_string())
        );
        assert_eq!(
            extract_post_number("https://cafe.naver.com/f-e/cafes/123/menus/14"),
            None
        );
    }

    #[test]
    fn test_element_text_normalizes_whitespace() {
        let html = scraper::Html::parse_fragment("<p>  a\n  b </p>");
        let sel = scraper::Selector::parse("p").unwrap();
        let element = html.select(&sel).next().unwrap();
        assert_eq!(element_text(&element), "a b");
    }
}
