// src/session.rs

//! Authenticated browsing session.
//!
//! Login is completed out of band: the user signs in with a normal browser
//! and exports the resulting Cookie header. The session replays those
//! cookies on every request. No credential handling happens here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, cookie::Jar};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Page and byte fetch capability used by the crawl pipeline.
///
/// The pipeline only ever sees this trait, so extraction logic runs against
/// fixture documents in tests without a network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return the response body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch a URL and return the raw response bytes.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Authenticated session over the cafe front-end.
pub struct AuthSession {
    client: Client,
}

impl AuthSession {
    /// Build a session from a raw Cookie header captured after login.
    pub fn new(cookie_header: &str, base_url: &str, config: &CrawlerConfig) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let host = base
            .host_str()
            .ok_or_else(|| AppError::session("base URL has no host"))?;
        let domain = cookie_domain(host);

        let jar = Arc::new(Jar::default());
        let mut added = 0usize;
        for pair in cookie_header.split(';') {
            let pair = pair.trim();
            if pair.is_empty() || !pair.contains('=') {
                continue;
            }
            jar.add_cookie_str(&format!("{pair}; Domain={domain}; Path=/"), &base);
            added += 1;
        }
        if added == 0 {
            return Err(AppError::session(
                "cookie header contains no cookies; export it from a signed-in browser",
            ));
        }
        log::debug!("session created with {added} cookie(s) for .{domain}");

        let client = Client::builder()
            .cookie_provider(jar)
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Build a session from a file holding the Cookie header on one line.
    pub fn from_cookie_file(
        path: impl AsRef<Path>,
        base_url: &str,
        config: &CrawlerConfig,
    ) -> Result<Self> {
        let header = std::fs::read_to_string(&path).map_err(|e| {
            AppError::session(format!(
                "cannot read cookie file {:?}: {e}",
                path.as_ref()
            ))
        })?;
        Self::new(header.trim(), base_url, config)
    }
}

#[async_trait]
impl PageFetcher for AuthSession {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Cookie scope: the registrable part of the host, so cookies set on the
/// front-end host also reach sibling subdomains.
fn cookie_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}
