use crate::types::{FetchOutcome, Result};
use async_trait::async_trait;

/// Source of raw feed documents.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the document at `url`. Never fails: transport and HTTP problems
    /// are reported through the returned outcome.
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Chat-completion backed summarizer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Human-readable name used in log lines.
    fn summarizer_name(&self) -> String;

    /// Summarize `text` with the given model, writing in `language`.
    async fn summarize(&self, text: &str, model: &str, language: &str) -> Result<String>;
}
