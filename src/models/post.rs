//! Post data structures.

use chrono::NaiveDateTime;

/// One post link discovered on a listing page.
///
/// Lives only for the duration of that page's processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Canonical post URL (contains an `/articles/{id}` segment)
    pub url: String,

    /// Interpreted publication time
    pub date: NaiveDateTime,
}

/// Metadata extracted from a single post page.
///
/// Every field defaults independently when resolution fails; only
/// `post_number` is derived from the URL rather than page content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDetail {
    /// Post identifier from the URL path (empty if the URL has none)
    pub post_number: String,

    /// Post title
    pub title: String,

    /// Author nickname
    pub nickname: String,

    /// Accepted content image URLs, insertion-ordered and deduplicated
    pub image_urls: Vec<String>,

    /// Source post URL
    pub url: String,

    /// Whether the post is an administrative notice
    pub is_notice: bool,
}

impl PostDetail {
    /// Record an image URL, ignoring duplicates while keeping discovery order.
    pub fn push_image_url(&mut self, url: String) {
        if !self.image_urls.contains(&url) {
            self.image_urls.push(url);
        }
    }
}

/// One flat export row. Column order and count are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRow {
    pub post_number: String,
    pub title: String,
    pub nickname: String,
    /// Populated downstream via manual profile lookup
    pub author_id: String,
    /// Placeholder column, filled in by hand
    pub branch: String,
    /// Placeholder column, filled in by hand
    pub teacher: String,
    /// Publication date, `YYYY-MM-DD`
    pub date: String,
    pub url: String,
    /// Successfully downloaded image URLs, in download order
    pub image_urls: Vec<String>,
}

impl ExportRow {
    /// Column headers, in export order.
    pub const HEADER: [&'static str; 10] = [
        "post_number",
        "title",
        "nickname",
        "author_id",
        "branch",
        "teacher",
        "date",
        "url",
        "image_urls",
        "image_count",
    ];

    /// Flatten into export fields. Image URLs are `;`-joined and counted.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.post_number.clone(),
            self.title.clone(),
            self.nickname.clone(),
            self.author_id.clone(),
            self.branch.clone(),
            self.teacher.clone(),
            self.date.clone(),
            self.url.clone(),
            self.image_urls.join(";"),
            self.image_urls.len().to_string(),
        ]
    }
}
