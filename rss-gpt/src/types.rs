use chrono::{DateTime, Utc};

/// Summary state of a feed entry.
///
/// `Generated` and `Degraded` both carry text that ends up in the output feed;
/// `Absent` and `Skipped` render without a summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryState {
    /// Not summarized (yet), or summarization is disabled.
    #[default]
    Absent,
    /// Over the per-run summarization budget; no LLM call was made.
    Skipped,
    /// Text returned by the summarizer.
    Generated(String),
    /// Article excerpt used after every attempt failed.
    Degraded(String),
}

impl SummaryState {
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryState::Generated(text) | SummaryState::Degraded(text) => Some(text),
            SummaryState::Absent | SummaryState::Skipped => None,
        }
    }
}

/// Working record for one entry during a section run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
    pub article: String,
    pub summary: SummaryState,
    pub published: Option<DateTime<Utc>>,
}

/// Entry as it came out of the feed parser, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub channel: ChannelInfo,
    pub entries: Vec<RawEntry>,
}

/// Result of a single fetch call. Non-success outcomes are data, not errors:
/// the pipeline logs them and moves on to the next URL.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(Vec<u8>),
    HttpStatus(u16),
    Failed(String),
}

impl FetchOutcome {
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Success(body) => format!("ok ({} bytes)", body.len()),
            FetchOutcome::HttpStatus(code) => code.to_string(),
            FetchOutcome::Failed(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionStatus {
    Completed,
    CompletedWithFetchErrors,
    Failed(String),
}

/// Counters for entries that were seen but not appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionStats {
    pub duplicates: usize,
    pub filtered: usize,
    pub over_cap: usize,
}

#[derive(Debug, Clone)]
pub struct SectionReport {
    pub name: String,
    pub status: SectionStatus,
    pub appended: usize,
    pub retained: usize,
    pub failed_urls: Vec<String>,
    pub rejections: RejectionStats,
}

impl SectionReport {
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SectionStatus::Failed(reason.into()),
            appended: 0,
            retained: 0,
            failed_urls: Vec::new(),
            rejections: RejectionStats::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Persist error: {0}")]
    Persist(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
