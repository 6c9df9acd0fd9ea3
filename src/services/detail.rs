// src/services/detail.rs

//! Post detail extraction.
//!
//! Resolves title, author nickname, notice flag and content image URLs from
//! a post document. Every field defaults independently when its selector
//! chain comes up empty; content shape never raises.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ImageConfig, PostDetail};
use crate::services::selectors::SelectorChain;
use crate::utils::{extract_post_number, resolve_url};

/// Nested context embedding the rendered post body.
const FRAME_CANDIDATES: [&str; 2] = ["iframe#cafe_main", "iframe[name='cafe_main']"];

/// Elements flagging an administrative notice.
const NOTICE_CANDIDATES: [&str; 6] = [
    ".notice-article",
    ".board-notice",
    "[class*='notice']",
    "[class*='Notice']",
    "span.icon-badge.notice",
    ".article-board__notice",
];

/// Title candidates across board template generations.
const TITLE_CANDIDATES: [&str; 4] = ["h3.title_text", ".tit_txt", ".article_title", ".title"];

const NICKNAME_CANDIDATES: [&str; 2] = [".nickname", ".nick_name"];

/// Content viewer container; images outside it are chrome, not content.
const VIEWER_CANDIDATES: [&str; 2] = ["#article_viewer", ".article_viewer"];

/// Bracketed title markers that flag a notice.
const NOTICE_MARKERS: [&str; 4] = ["[공지]", "[필독]", "[안내]", "[NOTICE]"];

/// Image source attributes: primary first, lazy-load fallbacks after.
const IMAGE_SRC_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

/// Titles at or past this length are not titles.
const MAX_TITLE_CHARS: usize = 200;

/// Extractor for post detail pages.
pub struct DetailExtractor {
    frame: SelectorChain,
    notice: SelectorChain,
    title: SelectorChain,
    nickname: SelectorChain,
    viewer: SelectorChain,
    image: Selector,
    images: ImageConfig,
}

impl DetailExtractor {
    pub fn new(images: ImageConfig) -> Result<Self> {
        Ok(Self {
            frame: SelectorChain::new("content frame", &FRAME_CANDIDATES)?,
            notice: SelectorChain::new("notice badge", &NOTICE_CANDIDATES)?,
            title: SelectorChain::new("title", &TITLE_CANDIDATES)?,
            nickname: SelectorChain::new("nickname", &NICKNAME_CANDIDATES)?,
            viewer: SelectorChain::new("content viewer", &VIEWER_CANDIDATES)?,
            image: Selector::parse("img").map_err(|e| AppError::selector("img", format!("{e:?}")))?,
            images,
        })
    }

    /// URL of the post's content frame, if the outer shell embeds one.
    ///
    /// `None` means the caller should extract from the outer document as the
    /// lower-fidelity fallback.
    pub fn content_frame_url(&self, outer: &Html, base: &Url) -> Option<String> {
        let frame = self.frame.resolve_first(outer.root_element())?;
        let src = frame.value().attr("src").filter(|s| !s.is_empty())?;
        Some(resolve_url(base, src))
    }

    /// Extract post metadata from a document.
    pub fn extract(&self, document: &Html, url: &str) -> PostDetail {
        let scope = document.root_element();

        let mut detail = PostDetail {
            post_number: extract_post_number(url).unwrap_or_default(),
            url: url.to_string(),
            ..PostDetail::default()
        };

        detail.title = self
            .title
            .resolve_text(scope, |t| {
                !t.is_empty() && t.chars().count() < MAX_TITLE_CHARS
            })
            .unwrap_or_default();
        if detail.title.is_empty() {
            log::debug!("{} unresolved for {url}", self.title.field());
        }

        detail.nickname = self
            .nickname
            .resolve_text(scope, |t| !t.is_empty())
            .unwrap_or_default();

        detail.is_notice = self.notice.resolve_first(scope).is_some()
            || NOTICE_MARKERS.iter().any(|m| detail.title.contains(m));

        self.collect_image_urls(scope, &mut detail);

        detail
    }

    /// Enumerate content images, apply the CDN allow-list, upgrade thumbnail
    /// renditions and deduplicate.
    fn collect_image_urls(&self, scope: ElementRef<'_>, detail: &mut PostDetail) {
        let container = self.viewer.resolve_first(scope).unwrap_or(scope);

        for img in container.select(&self.image) {
            let Some(src) = effective_src(&img) else {
                continue;
            };
            if !self.images.is_allowed(src) {
                log::debug!("image host not allowed: {src}");
                continue;
            }
            detail.push_image_url(self.images.upgrade_size(src));
        }
    }
}

/// Effective image source: first non-empty of the known source attributes.
fn effective_src<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    IMAGE_SRC_ATTRS
        .iter()
        .find_map(|attr| img.value().attr(attr).filter(|s| !s.is_empty()))
}
