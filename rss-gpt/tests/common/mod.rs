#![allow(dead_code)]

use async_trait::async_trait;
use rss_gpt::config::{RawSection, UrlList};
use rss_gpt::{
    FeedFetcher, FetchOutcome, HistoryStore, PipelineError, Result, SectionPipeline, SummarizationOrchestrator,
    Summarizer, SummaryPolicy,
};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Serves canned outcomes by URL. Unknown URLs fail.
#[derive(Default)]
pub struct ScriptedFetcher {
    outcomes: HashMap<String, FetchOutcome>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(mut self, url: &str, document: String) -> Self {
        self.outcomes
            .insert(url.to_string(), FetchOutcome::Success(document.into_bytes()));
        self
    }

    pub fn outcome(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchOutcome::Failed(format!("no scripted outcome for {}", url)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeCall {
    pub model: String,
    pub input: String,
}

/// Replies per model from a queue; `None` in the queue is a failed call.
/// Once a model's queue is empty the default reply is used.
pub struct ScriptedSummarizer {
    scripts: Mutex<HashMap<String, VecDeque<Option<String>>>>,
    default_reply: Option<String>,
    calls: Mutex<Vec<SummarizeCall>>,
}

impl ScriptedSummarizer {
    pub fn replying(reply: &str) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(self, model: &str, replies: &[Option<&str>]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), replies.iter().map(|r| r.map(str::to_string)).collect());
        self
    }

    pub fn calls(&self) -> Vec<SummarizeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    fn summarizer_name(&self) -> String {
        "scripted".to_string()
    }

    async fn summarize(&self, text: &str, model: &str, _language: &str) -> Result<String> {
        self.calls.lock().unwrap().push(SummarizeCall {
            model: model.to_string(),
            input: text.to_string(),
        });

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(VecDeque::pop_front);

        scripted
            .unwrap_or_else(|| self.default_reply.clone())
            .ok_or_else(|| PipelineError::Summarization(format!("{} unavailable", model)))
    }
}

pub struct Item<'a> {
    pub title: Option<&'a str>,
    pub link: &'a str,
    pub body: &'a str,
}

pub fn item<'a>(title: &'a str, link: &'a str, body: &'a str) -> Item<'a> {
    Item {
        title: Some(title),
        link,
        body,
    }
}

/// Minimal RSS 2.0 document with the given items.
pub fn rss(channel_title: &str, items: &[Item<'_>]) -> String {
    let mut doc = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n<title>{}</title>\n<link>https://source.example/</link>\n<description>{} feed</description>\n",
        channel_title, channel_title
    );
    for item in items {
        doc.push_str("<item>\n");
        if let Some(title) = item.title {
            doc.push_str(&format!("<title>{}</title>\n", title));
        }
        doc.push_str(&format!("<link>{}</link>\n", item.link));
        doc.push_str(&format!("<description><![CDATA[{}]]></description>\n", item.body));
        doc.push_str("</item>\n");
    }
    doc.push_str("</channel>\n</rss>\n");
    doc
}

pub fn section(name: &str, urls: &[&str], max_items: usize) -> RawSection {
    RawSection {
        name: Some(name.to_string()),
        url: Some(UrlList::List(urls.iter().map(|u| u.to_string()).collect())),
        max_items: Some(max_items),
        ..RawSection::default()
    }
}

pub fn policy() -> SummaryPolicy {
    SummaryPolicy {
        retry_delay: Duration::ZERO,
        ..SummaryPolicy::default()
    }
}

pub fn pipeline(
    base: &Path,
    fetcher: ScriptedFetcher,
    summarizer: Option<Arc<ScriptedSummarizer>>,
    max_entries: usize,
) -> SectionPipeline {
    let summarizer = summarizer.map(|s| s as Arc<dyn Summarizer>);
    SectionPipeline::new(
        Arc::new(fetcher),
        SummarizationOrchestrator::new(summarizer, policy()),
        HistoryStore::new(base),
        max_entries,
        None,
    )
}

pub fn links(base: &Path, name: &str) -> Vec<String> {
    HistoryStore::new(base).load(name).into_iter().map(|e| e.link).collect()
}
