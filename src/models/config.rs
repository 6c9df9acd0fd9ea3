//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::CrawlWindow;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Target cafe board settings
    #[serde(default)]
    pub board: BoardConfig,

    /// Date window for collection (inclusive on both ends)
    #[serde(default)]
    pub window: CrawlWindow,

    /// Image acceptance and rewrite settings
    #[serde(default)]
    pub images: ImageConfig,

    /// Output locations and export naming
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.crawler.empty_page_limit == 0 {
            return Err(AppError::validation("crawler.empty_page_limit must be > 0"));
        }
        if self.board.cafe_id.trim().is_empty() {
            return Err(AppError::validation("board.cafe_id is empty"));
        }
        if self.board.menu_id.trim().is_empty() {
            return Err(AppError::validation("board.menu_id is empty"));
        }
        if self.window.start > self.window.end {
            return Err(AppError::validation("window.start is after window.end"));
        }
        if self.images.allowed_hosts.is_empty() {
            return Err(AppError::validation("No allowed image hosts defined"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            board: BoardConfig::default(),
            window: CrawlWindow::default(),
            images: ImageConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between listing page fetches in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Delay between post visits in milliseconds
    #[serde(default = "defaults::post_delay")]
    pub post_delay_ms: u64,

    /// Hard cap on listing pages visited per run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Consecutive empty listing pages tolerated before giving up
    #[serde(default = "defaults::empty_page_limit")]
    pub empty_page_limit: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_delay_ms: defaults::page_delay(),
            post_delay_ms: defaults::post_delay(),
            max_pages: defaults::max_pages(),
            empty_page_limit: defaults::empty_page_limit(),
        }
    }
}

/// Target board identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Cafe identifier (numeric path segment)
    #[serde(default)]
    pub cafe_id: String,

    /// Menu (board section) identifier
    #[serde(default)]
    pub menu_id: String,

    /// Base URL of the cafe front-end
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// List view mode query value
    #[serde(default = "defaults::view_type")]
    pub view_type: String,
}

impl BoardConfig {
    /// Build the listing page URL for a 1-based page number.
    pub fn list_url(&self, page: u32) -> String {
        format!(
            "{}/f-e/cafes/{}/menus/{}?viewType={}&page={}",
            self.base_url.trim_end_matches('/'),
            self.cafe_id,
            self.menu_id,
            self.view_type,
            page
        )
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            cafe_id: String::new(),
            menu_id: String::new(),
            base_url: defaults::base_url(),
            view_type: defaults::view_type(),
        }
    }
}

/// Image URL acceptance and rewrite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Host fragments identifying the platform's image CDNs
    #[serde(default = "defaults::allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// Thumbnail-size query fragment to rewrite
    #[serde(default = "defaults::thumbnail_param")]
    pub thumbnail_param: String,

    /// Full-size query fragment to substitute
    #[serde(default = "defaults::fullsize_param")]
    pub fullsize_param: String,
}

impl ImageConfig {
    /// Check whether a URL points at one of the allowed CDN hosts.
    pub fn is_allowed(&self, url_str: &str) -> bool {
        let Ok(parsed) = url::Url::parse(url_str) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.allowed_hosts.iter().any(|h| host.contains(h.as_str()))
    }

    /// Rewrite a thumbnail-sized URL to its larger rendition.
    ///
    /// Only the size fragment is touched; all other query parameters are
    /// preserved as-is.
    pub fn upgrade_size(&self, url_str: &str) -> String {
        url_str.replace(&self.thumbnail_param, &self.fullsize_param)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: defaults::allowed_hosts(),
            thumbnail_param: defaults::thumbnail_param(),
            fullsize_param: defaults::fullsize_param(),
        }
    }
}

/// Output locations and export naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for downloaded images
    #[serde(default = "defaults::image_dir")]
    pub image_dir: String,

    /// Directory for the export document and run stats
    #[serde(default = "defaults::export_dir")]
    pub export_dir: String,

    /// Subject label embedded in the export filename
    #[serde(default)]
    pub subject: String,

    /// Explicit export filename (overrides the generated pattern)
    #[serde(default)]
    pub export_file: Option<String>,

    /// Write the first listing page's HTML for selector debugging
    #[serde(default)]
    pub dump_first_page: bool,
}

impl OutputConfig {
    /// Export filename: explicit override, or `{MM}월{subject}({start}~{end}).csv`.
    pub fn export_filename(&self, window: &CrawlWindow) -> String {
        if let Some(name) = &self.export_file {
            return name.clone();
        }
        format!(
            "{:02}월{}({}~{}).csv",
            chrono::Datelike::month(&window.start),
            self.subject,
            window.start.format("%Y%m%d"),
            window.end.format("%Y%m%d")
        )
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_dir: defaults::image_dir(),
            export_dir: defaults::export_dir(),
            subject: String::new(),
            export_file: None,
            dump_first_page: false,
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; cafecrawl/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_delay() -> u64 {
        1500
    }
    pub fn post_delay() -> u64 {
        800
    }
    pub fn max_pages() -> u32 {
        100
    }
    pub fn empty_page_limit() -> u32 {
        3
    }

    // Board defaults
    pub fn base_url() -> String {
        "https://cafe.naver.com".into()
    }
    pub fn view_type() -> String {
        "L".into()
    }

    // Image defaults
    pub fn allowed_hosts() -> Vec<String> {
        vec![
            "phinf.pstatic.net".into(),
            "blogfiles.naver.net".into(),
            "postfiles.pstatic.net".into(),
            "cafeskthumb".into(),
        ]
    }
    pub fn thumbnail_param() -> String {
        "type=w800".into()
    }
    pub fn fullsize_param() -> String {
        "type=w2000".into()
    }

    // Output defaults
    pub fn image_dir() -> String {
        "images".into()
    }
    pub fn export_dir() -> String {
        ".".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.board.cafe_id = "12345678".to_string();
        config.board.menu_id = "42".to_string();
        config
    }

    #[test]
    fn validate_accepts_populated_board() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_cafe_id() {
        let mut config = valid_config();
        config.board.cafe_id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let mut config = valid_config();
        config.window.start = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        config.window.end = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_cap() {
        let mut config = valid_config();
        config.crawler.max_pages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn list_url_includes_page_and_view_type() {
        let mut board = BoardConfig::default();
        board.cafe_id = "12345678".to_string();
        board.menu_id = "42".to_string();
        assert_eq!(
            board.list_url(3),
            "https://cafe.naver.com/f-e/cafes/12345678/menus/42?viewType=L&page=3"
        );
    }

    #[test]
    fn image_allowlist_matches_host_only() {
        let images = ImageConfig::default();
        assert!(images.is_allowed("https://postfiles.pstatic.net/a/b.jpg?type=w800"));
        assert!(images.is_allowed("https://cafeskthumb-phinf.pstatic.net/x.jpg"));
        assert!(!images.is_allowed("https://evil.example.com/postfiles.pstatic.net.jpg"));
        assert!(!images.is_allowed("not a url"));
    }

    #[test]
    fn upgrade_size_touches_only_the_size_fragment() {
        let images = ImageConfig::default();
        let rewritten = images.upgrade_size("https://p.net/img.jpg?type=w800&x=1");
        assert_eq!(rewritten, "https://p.net/img.jpg?type=w2000&x=1");
    }

    #[test]
    fn export_filename_pattern_and_override() {
        let mut output = OutputConfig::default();
        output.subject = "수학".to_string();
        let window = CrawlWindow {
            start: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 10, 6).unwrap(),
        };
        assert_eq!(
            output.export_filename(&window),
            "10월수학(20251001~20251006).csv"
        );

        output.export_file = Some("custom.csv".to_string());
        assert_eq!(output.export_filename(&window), "custom.csv");
    }
}
