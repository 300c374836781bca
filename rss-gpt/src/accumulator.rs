use crate::types::FeedEntry;
use std::collections::HashSet;
use tracing::debug;

/// Per-run state for one section: truncated history plus the entries accepted
/// so far. No link appears twice across the two lists.
#[derive(Debug)]
pub struct RunAccumulator {
    existing: Vec<FeedEntry>,
    appended: Vec<FeedEntry>,
    seen_links: HashSet<String>,
}

impl RunAccumulator {
    /// Keep the first `max_entries` history entries, dropping repeated links.
    pub fn new(history: Vec<FeedEntry>, max_entries: usize) -> Self {
        let mut seen_links = HashSet::new();
        let mut existing = Vec::with_capacity(history.len().min(max_entries));

        for entry in history.into_iter().take(max_entries) {
            if seen_links.insert(entry.link.clone()) {
                existing.push(entry);
            } else {
                debug!("Dropping repeated history entry: {}", entry.link);
            }
        }

        Self {
            existing,
            appended: Vec::new(),
            seen_links,
        }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen_links.contains(link)
    }

    /// Returns false (and drops the entry) if its link is already present.
    pub fn push(&mut self, entry: FeedEntry) -> bool {
        if !self.seen_links.insert(entry.link.clone()) {
            return false;
        }
        self.appended.push(entry);
        true
    }

    pub fn existing_len(&self) -> usize {
        self.existing.len()
    }

    pub fn appended_len(&self) -> usize {
        self.appended.len()
    }

    /// New entries first, then history.
    pub fn into_merged(self) -> Vec<FeedEntry> {
        let mut merged = self.appended;
        merged.extend(self.existing);
        merged
    }
}
