//! TOML configuration: one `[cfg]` table of process-wide defaults and an
//! ordered `[[source]]` list of sections.
//!
//! ```toml
//! [cfg]
//! base = "docs/"
//! keyword_length = 3
//! summary_length = 200
//! language = "zh"
//!
//! [[source]]
//! name = "hackernews"
//! url = "https://hnrss.org/newest, https://hnrss.org/best"
//! max_items = 5
//! filter_apply = "title"
//! filter_type = "exclude"
//! filter_rule = "Show HN"
//! ```

use crate::filter::FeedFilter;
use crate::orchestrator::{SummaryPolicy, DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};
use crate::summarizer::PromptSettings;
use crate::types::{PipelineError, Result};
use crate::utils::text::non_blank;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub cfg: GlobalConfig,
    #[serde(default, rename = "source")]
    pub sections: Vec<RawSection>,
}

/// Process-wide defaults from the `[cfg]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    pub base: PathBuf,
    pub keyword_length: u32,
    pub summary_length: u32,
    pub language: String,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_primary_model() -> String {
    DEFAULT_PRIMARY_MODEL.to_string()
}

fn default_fallback_model() -> String {
    DEFAULT_FALLBACK_MODEL.to_string()
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl GlobalConfig {
    pub fn prompt_settings(&self) -> PromptSettings {
        PromptSettings {
            keyword_length: self.keyword_length,
            summary_length: self.summary_length,
        }
    }

    pub fn summary_policy(&self) -> SummaryPolicy {
        SummaryPolicy {
            primary_model: self.primary_model.clone(),
            fallback_model: self.fallback_model.clone(),
            language: self.language.clone(),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..SummaryPolicy::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.base.as_os_str().is_empty() {
            return Err(PipelineError::Configuration("[cfg] base must not be empty".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(PipelineError::Configuration("[cfg] language must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Feed URLs as either a comma-separated string or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlList {
    Joined(String),
    List(Vec<String>),
}

impl UrlList {
    /// Trimmed, non-empty URLs in order, first occurrence wins.
    pub fn urls(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            UrlList::Joined(joined) => joined.split(',').collect(),
            UrlList::List(list) => list.iter().map(String::as_str).collect(),
        };

        let mut urls: Vec<String> = Vec::with_capacity(raw.len());
        for url in raw.into_iter().map(str::trim).filter(|u| !u.is_empty()) {
            if !urls.iter().any(|seen| seen == url) {
                urls.push(url.to_string());
            }
        }
        urls
    }
}

/// A section exactly as written in the config file. Validation happens per
/// section at run time so one bad section cannot stop the others; a table
/// whose fields have the wrong types is kept with `malformed` set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "toml::Table")]
pub struct RawSection {
    pub name: Option<String>,
    pub url: Option<UrlList>,
    pub max_items: Option<usize>,
    pub filter_apply: Option<String>,
    pub filter_type: Option<String>,
    pub filter_rule: Option<String>,
    pub malformed: Option<String>,
}

#[derive(Deserialize)]
struct SectionFields {
    name: Option<String>,
    url: Option<UrlList>,
    max_items: Option<usize>,
    filter_apply: Option<String>,
    filter_type: Option<String>,
    filter_rule: Option<String>,
}

impl From<toml::Table> for RawSection {
    fn from(table: toml::Table) -> Self {
        let name = table.get("name").and_then(toml::Value::as_str).map(str::to_string);

        match toml::Value::Table(table).try_into::<SectionFields>() {
            Ok(fields) => Self {
                name: fields.name,
                url: fields.url,
                max_items: fields.max_items,
                filter_apply: fields.filter_apply,
                filter_type: fields.filter_type,
                filter_rule: fields.filter_rule,
                malformed: None,
            },
            Err(e) => Self {
                name,
                malformed: Some(e.to_string().trim().to_string()),
                ..Self::default()
            },
        }
    }
}

impl RawSection {
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or("<unnamed>")
    }

    pub fn urls(&self) -> Vec<String> {
        self.url.as_ref().map(UrlList::urls).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<SectionConfig> {
        if let Some(problem) = &self.malformed {
            return Err(PipelineError::Configuration(format!(
                "section '{}' is malformed: {}",
                self.display_name(),
                problem
            )));
        }

        let name = non_blank(self.name.as_deref())
            .ok_or_else(|| PipelineError::Configuration("section is missing a name".to_string()))?
            .to_string();

        let feed_urls = self.urls();
        if feed_urls.is_empty() {
            return Err(PipelineError::Configuration(format!("section '{}' has no feed url", name)));
        }

        let filter = FeedFilter::from_parts(
            self.filter_apply.as_deref(),
            self.filter_type.as_deref(),
            self.filter_rule.as_deref(),
        )?;

        Ok(SectionConfig {
            name,
            feed_urls,
            filter,
            max_items: self.max_items.unwrap_or(0),
        })
    }
}

/// Validated, immutable section settings.
#[derive(Debug, Clone)]
pub struct SectionConfig {
    pub name: String,
    pub feed_urls: Vec<String>,
    pub filter: Option<FeedFilter>,
    pub max_items: usize,
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    config.cfg.validate()?;
    Ok(config)
}

/// Load the configuration source. Failure here is fatal for the whole run.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
