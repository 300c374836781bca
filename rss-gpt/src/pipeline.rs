use crate::accumulator::RunAccumulator;
use crate::config::{RawSection, SectionConfig};
use crate::fetcher::FetchLog;
use crate::filter::evaluate;
use crate::history::HistoryStore;
use crate::index::feed_url;
use crate::normalizer::normalize;
use crate::orchestrator::SummarizationOrchestrator;
use crate::parser::FeedParser;
use crate::render::FeedWriter;
use crate::traits::FeedFetcher;
use crate::types::{
    ChannelInfo, FetchOutcome, PipelineError, RejectionStats, Result, SectionReport, SectionStatus,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs one section end to end: validate, load history, fetch every URL,
/// summarize the new entries and write the merged feed file.
pub struct SectionPipeline {
    fetcher: Arc<dyn FeedFetcher>,
    orchestrator: SummarizationOrchestrator,
    history: HistoryStore,
    max_entries: usize,
    deployment_url: Option<String>,
}

/// What the fetch loop produced before anything is written.
struct Collected {
    accumulator: RunAccumulator,
    channel: Option<ChannelInfo>,
    failed_urls: Vec<String>,
    rejections: RejectionStats,
}

impl SectionPipeline {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        orchestrator: SummarizationOrchestrator,
        history: HistoryStore,
        max_entries: usize,
        deployment_url: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            orchestrator,
            history,
            max_entries,
            deployment_url,
        }
    }

    /// Never fails as a whole: every outcome, including a bad section
    /// definition, ends up in the returned report.
    pub async fn run(&self, raw: &RawSection) -> SectionReport {
        let start_time = Instant::now();

        let section = match raw.validate() {
            Ok(section) => section,
            Err(e) => {
                error!("Skipping section {}: {}", raw.display_name(), e);
                return SectionReport::failed(raw.display_name(), e.to_string());
            }
        };

        info!("Processing section {} ({} feed urls)", section.name, section.feed_urls.len());
        if let Some(filter) = &section.filter {
            debug!("Section {} filter: {}", section.name, filter);
        }

        let collected = self.collect(&section).await;
        let appended = collected.accumulator.appended_len();
        let retained = collected.accumulator.existing_len();

        if let Err(e) = self.write_feed(&section, collected.channel, collected.accumulator) {
            error!("Failed to write feed for section {}: {}", section.name, e);
            return SectionReport {
                failed_urls: collected.failed_urls,
                rejections: collected.rejections,
                ..SectionReport::failed(section.name, e.to_string())
            };
        }

        let status = if collected.failed_urls.is_empty() {
            SectionStatus::Completed
        } else {
            SectionStatus::CompletedWithFetchErrors
        };

        info!(
            "Section {}: {} new entries, {} kept from history, {} failed urls ({}ms)",
            section.name,
            appended,
            retained,
            collected.failed_urls.len(),
            start_time.elapsed().as_millis()
        );

        SectionReport {
            name: section.name,
            status,
            appended,
            retained,
            failed_urls: collected.failed_urls,
            rejections: collected.rejections,
        }
    }

    async fn collect(&self, section: &SectionConfig) -> Collected {
        let history = self.history.load(&section.name);
        let fetch_log = FetchLog::new(self.history.log_path(&section.name));

        let mut collected = Collected {
            accumulator: RunAccumulator::new(history, self.max_entries),
            channel: None,
            failed_urls: Vec::new(),
            rejections: RejectionStats::default(),
        };
        let mut accepted = 0usize;

        for url in &section.feed_urls {
            let parsed = match self.fetcher.fetch(url).await {
                FetchOutcome::Success(body) => FeedParser::parse_feed(&body)
                    .map_err(|e| FetchOutcome::Failed(e.to_string())),
                outcome => Err(outcome),
            };

            let feed = match parsed {
                Ok(feed) => feed,
                Err(outcome) => {
                    let failure = PipelineError::Fetch {
                        url: url.clone(),
                        reason: outcome.describe(),
                    };
                    warn!("{}", failure);
                    if let Err(e) = fetch_log.record(&outcome) {
                        warn!("Failed to append to {}: {}", fetch_log.path().display(), e);
                    }
                    collected.failed_urls.push(url.clone());
                    continue;
                }
            };

            let total = feed.entries.len();
            for (position, raw_entry) in feed.entries.into_iter().enumerate() {
                if accepted > self.max_entries {
                    debug!("Entry cap of {} reached, skipping the rest of {}", self.max_entries, url);
                    collected.rejections.over_cap += total - position;
                    break;
                }

                let entry = normalize(raw_entry);

                if collected.accumulator.contains(&entry.link) {
                    collected.rejections.duplicates += 1;
                    continue;
                }

                if !evaluate(&entry, section.filter.as_ref()) {
                    info!("Filtered out: {}", entry.title);
                    collected.rejections.filtered += 1;
                    continue;
                }

                accepted += 1;
                let entry = self
                    .orchestrator
                    .maybe_summarize(entry, accepted, section.max_items)
                    .await;
                collected.accumulator.push(entry);
            }

            collected.channel = Some(feed.channel);
        }

        collected
    }

    fn write_feed(
        &self,
        section: &SectionConfig,
        channel: Option<ChannelInfo>,
        accumulator: RunAccumulator,
    ) -> Result<()> {
        let channel = channel.unwrap_or_else(|| ChannelInfo {
            title: Some(section.name.clone()),
            description: None,
            link: Some(feed_url(self.deployment_url.as_deref(), &section.name)),
        });

        let entries = accumulator.into_merged();
        let document = FeedWriter::render(&channel, &entries)?;
        let path = self.history.feed_path(&section.name);
        FeedWriter::persist(&path, &document)?;

        debug!("Wrote {} entries to {}", entries.len(), path.display());
        Ok(())
    }
}
