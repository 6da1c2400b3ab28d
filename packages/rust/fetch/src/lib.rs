//! Page fetching and corpus scraping.
//!
//! This crate provides:
//! - [`Fetcher`]: an HTTP client with SSRF guards, timeouts and a body cap
//! - [`Fetcher::scrape_site`]: fetch a page and turn it into a [`SiteRecord`]
//! - [`Fetcher::scrape_many`]: bounded-concurrency scraping of a URL list

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use scraper::Html;
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use sitegen_extract::extract_site_record;
use sitegen_shared::{ExtractionConfig, FetchConfig, Result, SiteGenError, SiteRecord};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("SiteGen/", env!("CARGO_PKG_VERSION"));

/// Bodies larger than this are rejected.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A successfully fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub html: String,
    /// SHA-256 of the body, hex-encoded.
    pub content_hash: String,
}

/// Outcome of [`Fetcher::scrape_many`].
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// Records in input order.
    pub records: Vec<SiteRecord>,
    /// `(url, error message)` for every failed page, in input order.
    pub errors: Vec<(String, String)>,
    /// URLs beyond `max_pages` that were not attempted.
    pub skipped: usize,
    pub duration: Duration,
}

/// Progress callback for scraping.
pub trait ScrapeProgress: Send + Sync {
    /// Called once per finished URL, successful or not.
    fn page_done(&self, url: &str, ok: bool, done: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ScrapeProgress for SilentProgress {
    fn page_done(&self, _url: &str, _ok: bool, _done: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP fetcher for single pages.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_localhost: bool,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiteGenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            allow_localhost: false,
        })
    }

    /// Allow fetching localhost/private IPs (for integration tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Fetch one HTML page.
    #[instrument(skip(self), fields(%url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<FetchedPage> {
        if !self.allow_localhost && is_ssrf_target(url) {
            return Err(SiteGenError::Network(format!("{url}: refusing to fetch private or non-HTTP target")));
        }

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SiteGenError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteGenError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.contains("html") {
                return Err(SiteGenError::Network(format!(
                    "{url}: expected HTML, got {content_type}"
                )));
            }
        }

        if response
            .content_length()
            .is_some_and(|len| len as usize > MAX_BODY_BYTES)
        {
            return Err(SiteGenError::Network(format!("{url}: body exceeds {MAX_BODY_BYTES} bytes")));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| SiteGenError::Network(format!("{url}: body read failed: {e}")))?;

        if html.len() > MAX_BODY_BYTES {
            return Err(SiteGenError::Network(format!("{url}: body exceeds {MAX_BODY_BYTES} bytes")));
        }

        debug!(status = status.as_u16(), bytes = html.len(), "page fetched");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_hash: compute_hash(&html),
            html,
        })
    }

    /// Fetch a page and extract its corpus record.
    pub async fn scrape_site(&self, url: &Url, extraction: &ExtractionConfig) -> Result<SiteRecord> {
        let page = self.fetch_page(url).await?;
        let doc = Html::parse_document(&page.html);
        extract_site_record(&doc, &page.url, extraction)
    }

    /// Scrape up to `max_pages` URLs with at most `concurrency` in flight.
    ///
    /// Failures are collected in the report rather than aborting the batch.
    #[instrument(skip_all, fields(urls = urls.len(), concurrency = concurrency))]
    pub async fn scrape_many(
        &self,
        urls: &[Url],
        extraction: &ExtractionConfig,
        concurrency: usize,
        progress: Arc<dyn ScrapeProgress>,
    ) -> ScrapeReport {
        let start = Instant::now();
        let take = urls.len().min(self.config.max_pages);
        let skipped = urls.len() - take;
        if skipped > 0 {
            warn!(skipped, max_pages = self.config.max_pages, "URL list truncated");
        }

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, url) in urls[..take].iter().cloned().enumerate() {
            let fetcher = self.clone();
            let extraction = extraction.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = fetcher.scrape_site(&url, &extraction).await;
                (index, url, result)
            });
        }

        let mut outcomes = Vec::with_capacity(take);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, url, result)) => {
                    progress.page_done(url.as_str(), result.is_ok(), outcomes.len() + 1, take);
                    outcomes.push((index, url, result));
                }
                Err(e) => warn!(error = %e, "scrape task failed to complete"),
            }
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = ScrapeReport {
            skipped,
            ..ScrapeReport::default()
        };
        for (_, url, result) in outcomes {
            match result {
                Ok(record) => report.records.push(record),
                Err(e) => {
                    warn!(%url, error = %e, "scrape failed");
                    report.errors.push((url.to_string(), e.to_string()));
                }
            }
        }
        report.duration = start.elapsed();

        info!(
            records = report.records.len(),
            errors = report.errors.len(),
            skipped,
            elapsed_ms = report.duration.as_millis() as u64,
            "scrape complete"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(url::Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(url::Host::Domain(host)) => {
            host == "localhost" || host.ends_with(".local") || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse a newline-separated URL list, skipping blanks and `#` comments.
pub fn parse_url_list(content: &str) -> Result<Vec<Url>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            Url::parse(line).map_err(|e| SiteGenError::validation(format!("invalid URL '{line}': {e}")))
        })
        .collect()
}
