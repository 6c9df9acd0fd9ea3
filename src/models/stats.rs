//! Crawl run statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters accumulated over one crawl run, persisted alongside the export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    /// Listing pages fetched
    pub pages_visited: u32,

    /// Rows handed to the export sink
    pub posts_collected: usize,

    /// In-window posts dropped for carrying a notice flag
    pub notices_skipped: usize,

    /// Listing entries skipped for an unreadable date
    pub dates_unparsed: usize,

    /// Images written to disk
    pub images_downloaded: usize,

    /// Image fetches that failed (the post is still exported)
    pub image_failures: usize,
}
