// src/pipeline/crawl.rs

//! Post crawling pipeline.
//!
//! Drives the page loop: fetch a listing page, discover in-window entries,
//! extract each post, download its images, and hand completed rows to the
//! export sink. Strictly sequential; the session is exclusively owned by
//! this loop for the duration of a run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, Utc};
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{Config, CrawlStats, ExportRow, ListingEntry, PostDetail};
use crate::services::images;
use crate::services::{DetailExtractor, ListingScanner, PageDiscovery};
use crate::session::PageFetcher;
use crate::storage::ExportSink;

/// Run the post crawler over the configured board and window.
///
/// Always finishes the sink, so an export artifact exists even when the run
/// collects nothing. Content-shape irregularities never abort the run.
pub async fn run_crawler(
    config: &Config,
    fetcher: &dyn PageFetcher,
    sink: &mut dyn ExportSink,
) -> Result<CrawlStats> {
    let mut stats = CrawlStats {
        start_time: Some(Utc::now()),
        ..CrawlStats::default()
    };

    let scanner = ListingScanner::new()?;
    let extractor = DetailExtractor::new(config.images.clone())?;
    let base = Url::parse(&config.board.base_url)?;

    let image_dir = PathBuf::from(&config.output.image_dir);
    tokio::fs::create_dir_all(&image_dir).await?;
    tokio::fs::create_dir_all(&config.output.export_dir).await?;

    let now = Local::now().naive_local();
    let page_delay = Duration::from_millis(config.crawler.page_delay_ms);
    let post_delay = Duration::from_millis(config.crawler.post_delay_ms);

    log::info!(
        "crawling cafe {} menu {} from {} to {}",
        config.board.cafe_id,
        config.board.menu_id,
        config.window.start,
        config.window.end
    );

    let mut page = 1u32;
    let mut empty_streak = 0u32;

    while page <= config.crawler.max_pages {
        let url = config.board.list_url(page);
        log::info!("scanning page {page}");
        stats.pages_visited += 1;

        let discovery = match fetcher.fetch_text(&url).await {
            Ok(html) => {
                if page == 1 && config.output.dump_first_page {
                    dump_page(&config.output.export_dir, &html).await;
                }
                let document = Html::parse_document(&html);
                scanner.discover(&document, &base, &config.window, now)
            }
            Err(e) => {
                log::warn!("failed to fetch page {page}: {e}");
                PageDiscovery::default()
            }
        };
        stats.dates_unparsed += discovery.dates_unparsed;

        if discovery.entries.is_empty() && !discovery.stop_after_page {
            empty_streak += 1;
            log::info!("page {page} yielded no entries ({empty_streak} consecutive)");
            if empty_streak >= config.crawler.empty_page_limit {
                log::info!("giving up after {empty_streak} empty pages");
                break;
            }
        } else {
            empty_streak = 0;
        }

        for entry in &discovery.entries {
            tokio::time::sleep(post_delay).await;
            match process_post(entry, fetcher, &extractor, &base, &image_dir, &mut stats).await {
                Ok(Some(row)) => {
                    sink.push(row);
                    stats.posts_collected += 1;
                }
                Ok(None) => {}
                Err(e) => log::warn!("failed to process {}: {e}", entry.url),
            }
        }

        if discovery.stop_after_page {
            break;
        }
        page += 1;
        tokio::time::sleep(page_delay).await;
    }

    if page > config.crawler.max_pages {
        log::info!("page cap of {} reached", config.crawler.max_pages);
    }

    let location = sink.finish().await?;
    stats.end_time = Some(Utc::now());
    write_stats(&config.output.export_dir, &stats).await;

    log::info!(
        "crawl complete: {} post(s) collected across {} page(s), {} notice(s) skipped",
        stats.posts_collected,
        stats.pages_visited,
        stats.notices_skipped
    );
    log::info!("export written to {location}");

    Ok(stats)
}

/// Visit one post: enter its content frame (falling back to the outer
/// document), extract, download images, and build the export row.
///
/// Returns `None` when the post turns out to be a notice.
async fn process_post(
    entry: &ListingEntry,
    fetcher: &dyn PageFetcher,
    extractor: &DetailExtractor,
    base: &Url,
    image_dir: &Path,
    stats: &mut CrawlStats,
) -> Result<Option<ExportRow>> {
    let outer_text = fetcher.fetch_text(&entry.url).await?;

    let frame_url = {
        let outer = Html::parse_document(&outer_text);
        extractor.content_frame_url(&outer, base)
    };
    let body_text = match frame_url {
        Some(frame) => match fetcher.fetch_text(&frame).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "content frame fetch failed for {}, using outer document: {e}",
                    entry.url
                );
                outer_text
            }
        },
        None => outer_text,
    };

    let detail = {
        let document = Html::parse_document(&body_text);
        extractor.extract(&document, &entry.url)
    };

    if detail.is_notice {
        let label: String = detail.title.chars().take(30).collect();
        log::info!("skipping notice: {label}");
        stats.notices_skipped += 1;
        return Ok(None);
    }

    let downloaded = download_images(&detail, fetcher, image_dir, stats).await;

    Ok(Some(ExportRow {
        post_number: detail.post_number,
        title: detail.title,
        nickname: detail.nickname,
        author_id: String::new(),
        branch: String::new(),
        teacher: String::new(),
        date: entry.date.format("%Y-%m-%d").to_string(),
        url: detail.url,
        image_urls: downloaded,
    }))
}

/// Best-effort image downloads. A failed URL is absent from the returned
/// list; it never aborts the post.
async fn download_images(
    detail: &PostDetail,
    fetcher: &dyn PageFetcher,
    image_dir: &Path,
    stats: &mut CrawlStats,
) -> Vec<String> {
    let total = detail.image_urls.len();
    let mut downloaded = Vec::new();

    for (idx, url) in detail.image_urls.iter().enumerate() {
        let filename = images::image_filename(&detail.post_number, &detail.title, idx + 1, total);
        let path = image_dir.join(&filename);
        match images::download(fetcher, url, &path).await {
            Ok(()) => {
                log::debug!("saved {filename}");
                stats.images_downloaded += 1;
                downloaded.push(url.clone());
            }
            Err(e) => {
                log::warn!("image download failed for {url}: {e}");
                stats.image_failures += 1;
            }
        }
    }

    downloaded
}

/// Keep the first listing page's HTML around for selector debugging.
async fn dump_page(dir: &str, html: &str) {
    let path = Path::new(dir).join("debug_page.html");
    match tokio::fs::write(&path, html).await {
        Ok(()) => log::info!("wrote {}", path.display()),
        Err(e) => log::warn!("could not write {}: {e}", path.display()),
    }
}

/// Persist run statistics next to the export, best effort.
async fn write_stats(dir: &str, stats: &CrawlStats) {
    let path = Path::new(dir).join("stats.json");
    match serde_json::to_vec_pretty(stats) {
        Ok(bytes) => {
            if let Err(e) = tokio::fs::write(&path, bytes).await {
                log::warn!("could not write {}: {e}", path.display());
            }
        }
        Err(e) => log::warn!("could not serialize stats: {e}"),
    }
}
