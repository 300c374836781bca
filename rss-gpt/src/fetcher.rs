use crate::traits::FeedFetcher;
use crate::types::{FetchConfig, FetchOutcome, PipelineError, Result};
use crate::utils::url::is_valid_feed_url;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct HttpFeedFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFeedFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_body(&self, url: &str) -> std::result::Result<FetchOutcome, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/rss+xml, application/atom+xml, application/feed+json, application/xml, text/xml, */*;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(FetchOutcome::HttpStatus(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if exceeds_size_limit(content_length as usize, self.config.max_feed_size_mb) {
                return Ok(FetchOutcome::Failed(format!(
                    "Feed too large: {}MB",
                    content_length as usize / (1024 * 1024)
                )));
            }
        }

        // Chunked responses carry no Content-Length.
        let body = response.bytes().await?;
        if exceeds_size_limit(body.len(), self.config.max_feed_size_mb) {
            return Ok(FetchOutcome::Failed(format!(
                "Feed too large: {} bytes",
                body.len()
            )));
        }
        Ok(FetchOutcome::Success(body.to_vec()))
    }
}

fn exceeds_size_limit(bytes: usize, max_mb: usize) -> bool {
    bytes > max_mb * 1024 * 1024
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if !is_valid_feed_url(url) {
            return FetchOutcome::Failed(format!("Invalid feed URL: {}", url));
        }

        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        match self.fetch_body(url).await {
            Ok(FetchOutcome::Success(body)) => {
                info!(
                    "Successfully fetched feed: {} ({} bytes in {}ms)",
                    url,
                    body.len(),
                    start_time.elapsed().as_millis()
                );
                FetchOutcome::Success(body)
            }
            Ok(outcome) => {
                warn!("Fetch of {} returned {}", url, outcome.describe());
                outcome
            }
            Err(e) if e.is_timeout() => FetchOutcome::Failed(format!(
                "Request timed out after {} seconds",
                self.config.timeout_seconds
            )),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

/// Append-only per-section diagnostics file.
pub struct FetchLog {
    path: PathBuf,
}

impl FetchLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, outcome: &FetchOutcome) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "Fetch error: {}", outcome.describe()).map_err(PipelineError::Io)
    }
}
