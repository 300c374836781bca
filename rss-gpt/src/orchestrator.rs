//! Budgeted summarization with bounded retries and a two-model cascade.
//!
//! Each new entry goes through [`SummarizationOrchestrator::maybe_summarize`]:
//! entries past the per-run budget are marked skipped, entries are left
//! untouched when no summarizer is configured, and everything else gets up to
//! `max_attempts` attempts of primary-then-fallback before falling back to an
//! excerpt of the article. Nothing in here returns an error.

use crate::sanitize::clean_html;
use crate::traits::Summarizer;
use crate::types::{FeedEntry, SummaryState};
use crate::utils::text::{excerpt, truncate_chars};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4-turbo-preview";

#[derive(Debug, Clone)]
pub struct SummaryPolicy {
    pub primary_model: String,
    pub fallback_model: String,
    pub language: String,
    pub max_attempts: u32,
    /// Characters of cleaned article sent per request.
    pub max_input_chars: usize,
    /// Characters of cleaned article kept in a degraded summary.
    pub degraded_chars: usize,
    /// Initial delay between attempts; zero disables waiting.
    pub retry_delay: Duration,
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            language: "en".to_string(),
            max_attempts: 3,
            max_input_chars: 4000,
            degraded_chars: 200,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl SummaryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.retry_delay,
            initial_interval: self.retry_delay,
            max_interval: self.retry_delay * 8,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// How one attempt (primary, then fallback) ended.
enum AttemptResult {
    Summarized { model: String, text: String },
    BothFailed,
}

pub struct SummarizationOrchestrator {
    summarizer: Option<Arc<dyn Summarizer>>,
    policy: SummaryPolicy,
}

impl SummarizationOrchestrator {
    pub fn new(summarizer: Option<Arc<dyn Summarizer>>, policy: SummaryPolicy) -> Self {
        if let Some(summarizer) = &summarizer {
            info!(
                "Summarization enabled via {} (primary {}, fallback {})",
                summarizer.summarizer_name(),
                policy.primary_model,
                policy.fallback_model
            );
        } else {
            info!("Summarization disabled: no LLM credential configured");
        }
        Self { summarizer, policy }
    }

    pub fn is_enabled(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Populate `entry.summary`. `accepted_so_far` counts this entry.
    pub async fn maybe_summarize(&self, mut entry: FeedEntry, accepted_so_far: usize, max_items: usize) -> FeedEntry {
        if accepted_so_far > max_items {
            debug!("Budget of {} reached, skipping summary for {}", max_items, entry.link);
            entry.summary = SummaryState::Skipped;
            return entry;
        }

        let Some(summarizer) = self.summarizer.as_deref() else {
            return entry;
        };

        let cleaned = clean_html(&entry.article);
        entry.summary = self.summarize_with_retries(summarizer, &cleaned).await;
        entry
    }

    async fn summarize_with_retries(&self, summarizer: &dyn Summarizer, cleaned: &str) -> SummaryState {
        let mut backoff = self.policy.backoff();

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(summarizer, cleaned, attempt).await {
                AttemptResult::Summarized { model, text } => {
                    info!("Summarized using {} (attempt {})", model, attempt);
                    return SummaryState::Generated(text.trim().to_string());
                }
                AttemptResult::BothFailed if attempt < self.policy.max_attempts => {
                    if let Some(delay) = backoff.next_backoff().filter(|d| !d.is_zero()) {
                        debug!("Waiting {:?} before attempt {}", delay, attempt + 1);
                        tokio::time::sleep(delay).await;
                    }
                }
                AttemptResult::BothFailed => {}
            }
        }

        info!(
            "Summarization failed after {} attempts, using article beginning as summary",
            self.policy.max_attempts
        );
        SummaryState::Degraded(excerpt(cleaned, self.policy.degraded_chars))
    }

    async fn attempt(&self, summarizer: &dyn Summarizer, cleaned: &str, attempt: u32) -> AttemptResult {
        let input = truncate_chars(cleaned, self.policy.max_input_chars);
        let SummaryPolicy {
            primary_model,
            fallback_model,
            language,
            ..
        } = &self.policy;

        match summarizer.summarize(input, primary_model, language).await {
            Ok(text) => {
                return AttemptResult::Summarized {
                    model: primary_model.clone(),
                    text,
                }
            }
            Err(e) => warn!("{} failed (attempt {}): {}", primary_model, attempt, e),
        }

        match summarizer.summarize(input, fallback_model, language).await {
            Ok(text) => AttemptResult::Summarized {
                model: fallback_model.clone(),
                text,
            },
            Err(e) => {
                error!("Summarization failed (attempt {}): {}", attempt, e);
                AttemptResult::BothFailed
            }
        }
    }
}
