// src/services/images.rs

//! Image filename derivation and download.

use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::session::PageFetcher;

/// Longest sanitized title stem embedded in a filename.
const MAX_TITLE_STEM: usize = 30;

/// Reduce a post title to a filesystem-safe stem.
///
/// Keeps alphanumerics (any script), spaces, underscores and hyphens, trims,
/// and caps the length at 30 grapheme clusters.
pub fn sanitize_title(title: &str) -> String {
    let filtered: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    filtered.trim().graphemes(true).take(MAX_TITLE_STEM).collect()
}

/// Deterministic filename for the `index`-th (1-based) image of a post.
///
/// A post with a single image gets no numeric suffix.
pub fn image_filename(post_number: &str, title: &str, index: usize, total: usize) -> String {
    let stem = sanitize_title(title);
    if total == 1 {
        format!("{post_number} {stem}.jpg")
    } else {
        format!("{post_number} {stem}_{index}.jpg")
    }
}

/// Fetch one image URL to disk.
///
/// A failure is per-URL; the caller records it and moves on.
pub async fn download(fetcher: &dyn PageFetcher, url: &str, path: &Path) -> Result<()> {
    let bytes = fetcher.fetch_bytes(url).await?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;

    #[test]
    fn sanitize_drops_punctuation_and_truncates() {
        assert_eq!(sanitize_title("Weekly Update!!"), "Weekly Update");
        assert_eq!(sanitize_title("  spaced  "), "spaced");
        assert_eq!(sanitize_title("a/b\\c:d*e?f"), "abcdef");

        let long = "가".repeat(40);
        assert_eq!(sanitize_title(&long).graphemes(true).count(), 30);
    }

    #[test]
    fn korean_titles_survive_sanitization() {
        assert_eq!(sanitize_title("10월 수업 안내"), "10월 수업 안내");
    }

    #[test]
    fn multi_image_posts_get_numeric_suffixes() {
        assert_eq!(
            image_filename("123", "Weekly Update!!", 1, 2),
            "123 Weekly Update_1.jpg"
        );
        assert_eq!(
            image_filename("123", "Weekly Update!!", 2, 2),
            "123 Weekly Update_2.jpg"
        );
    }

    #[test]
    fn single_image_posts_get_no_suffix() {
        assert_eq!(
            image_filename("123", "Weekly Update!!", 1, 1),
            "123 Weekly Update.jpg"
        );
    }

    struct ByteFixtures(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl PageFetcher for ByteFixtures {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            Err(AppError::crawl("fetch_text", format!("unexpected: {url}")))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::crawl("fetch_bytes", format!("no fixture for {url}")))
        }
    }

    #[tokio::test]
    async fn download_writes_the_fetched_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("123 post.jpg");
        let fetcher = ByteFixtures(HashMap::from([(
            "https://postfiles.pstatic.net/1.jpg".to_string(),
            vec![0xFF, 0xD8, 0xFF],
        )]));

        download(&fetcher, "https://postfiles.pstatic.net/1.jpg", &path)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn download_failure_surfaces_as_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        let fetcher = ByteFixtures(HashMap::new());

        let result = download(&fetcher, "https://postfiles.pstatic.net/404.jpg", &path).await;
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
