use crate::normalizer::derive_title;
use crate::types::{FeedEntry, SummaryState};
use crate::utils::text::non_blank;
use feed_rs::parser;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Reads the feed files written by earlier runs.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    base_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn feed_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.xml", name))
    }

    pub fn log_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.log", name))
    }

    /// Entries of the persisted feed in file order. A missing, unreadable or
    /// malformed file yields an empty history.
    pub fn load(&self, name: &str) -> Vec<FeedEntry> {
        let path = self.feed_path(name);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No previous feed at {}", path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read previous feed {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        match parser::parse(content.as_slice()) {
            Ok(feed) => {
                let entries: Vec<FeedEntry> = feed.entries.into_iter().map(history_entry).collect();
                info!("Existing entries: {}", entries.len());
                entries
            }
            Err(e) => {
                warn!("Ignoring malformed previous feed {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

fn history_entry(entry: feed_rs::model::Entry) -> FeedEntry {
    let link = entry.links.first().map(|l| l.href.clone()).unwrap_or_default();
    let content = entry.content.and_then(|c| c.body);
    let description = entry.summary.map(|s| s.content);

    // Our own files keep the article in content:encoded and the summary in
    // description; anything else is treated as an unsummarized article.
    let (body, summary) = match non_blank(content.as_deref()) {
        Some(article) => (
            Some(article.to_string()),
            non_blank(description.as_deref())
                .map(|s| SummaryState::Generated(s.to_string()))
                .unwrap_or_default(),
        ),
        None => (non_blank(description.as_deref()).map(str::to_string), SummaryState::Absent),
    };

    let title = derive_title(entry.title.as_ref().map(|t| t.content.as_str()), body.as_deref(), &link);
    let article = body.unwrap_or_else(|| title.clone());

    FeedEntry {
        link,
        title,
        article,
        summary,
        published: entry.published.or(entry.updated),
    }
}
