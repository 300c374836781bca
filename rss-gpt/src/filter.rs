//! Per-section keep/drop rules applied to normalized entries.

use crate::types::{FeedEntry, PipelineError, Result};
use crate::utils::text::non_blank;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    Title,
    Article,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Include,
    Exclude,
    RegexMatch,
    RegexNotMatch,
}

impl FilterTarget {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(FilterTarget::Title),
            "article" => Ok(FilterTarget::Article),
            "link" => Ok(FilterTarget::Link),
            other => Err(PipelineError::Configuration(format!("filter_apply '{}' not supported", other))),
        }
    }
}

impl FilterMode {
    /// Accepts `regex match`, `regex_match`, `regexMatch` and the like.
    pub fn parse(value: &str) -> Result<Self> {
        let key: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "include" => Ok(FilterMode::Include),
            "exclude" => Ok(FilterMode::Exclude),
            "regexmatch" => Ok(FilterMode::RegexMatch),
            "regexnotmatch" => Ok(FilterMode::RegexNotMatch),
            _ => Err(PipelineError::Configuration(format!("filter_type '{}' not supported", value.trim()))),
        }
    }

    fn keeps_on_match(self) -> bool {
        matches!(self, FilterMode::Include | FilterMode::RegexMatch)
    }
}

#[derive(Debug, Clone)]
pub struct FeedFilter {
    pub applies_to: FilterTarget,
    pub mode: FilterMode,
    pub rule: Regex,
}

impl FeedFilter {
    /// Build a filter from the raw section fields. Blank values count as unset;
    /// all three must be set together or not at all.
    pub fn from_parts(apply: Option<&str>, mode: Option<&str>, rule: Option<&str>) -> Result<Option<Self>> {
        match (non_blank(apply), non_blank(mode), non_blank(rule)) {
            (None, None, None) => Ok(None),
            (Some(apply), Some(mode), Some(rule)) => {
                let applies_to = FilterTarget::parse(apply)?;
                let mode = FilterMode::parse(mode)?;
                let rule = Regex::new(rule)
                    .map_err(|e| PipelineError::Configuration(format!("invalid filter_rule '{}': {}", rule, e)))?;
                Ok(Some(Self { applies_to, mode, rule }))
            }
            _ => Err(PipelineError::Configuration(
                "filter_apply, filter_type and filter_rule must be set together".to_string(),
            )),
        }
    }

    pub fn matches(&self, entry: &FeedEntry) -> bool {
        let text = match self.applies_to {
            FilterTarget::Title => &entry.title,
            FilterTarget::Article => &entry.article,
            FilterTarget::Link => &entry.link,
        };
        self.rule.is_match(text) == self.mode.keeps_on_match()
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} /{}/", self.applies_to, self.mode, self.rule.as_str())
    }
}

/// Decide whether an entry is kept. No filter keeps everything.
pub fn evaluate(entry: &FeedEntry, filter: Option<&FeedFilter>) -> bool {
    filter.map_or(true, |f| f.matches(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryState;

    fn entry(title: &str, article: &str, link: &str) -> FeedEntry {
        FeedEntry {
            link: link.to_string(),
            title: title.to_string(),
            article: article.to_string(),
            summary: SummaryState::Absent,
            published: None,
        }
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert!(FeedFilter::from_parts(None, Some(""), None).unwrap().is_none());
        assert!(evaluate(&entry("t", "a", "l"), None));
    }

    #[test]
    fn exclude_rejects_matching_article() {
        let filter = FeedFilter::from_parts(Some("article"), Some("exclude"), Some("giveaway"))
            .unwrap()
            .unwrap();
        assert!(!evaluate(&entry("Deal", "Big giveaway today", "https://a/1"), Some(&filter)));
        assert!(evaluate(&entry("Deal", "Regular news", "https://a/2"), Some(&filter)));
    }

    #[test]
    fn include_and_regex_modes() {
        let include = FeedFilter::from_parts(Some("title"), Some("include"), Some("Rust|Go"))
            .unwrap()
            .unwrap();
        assert!(evaluate(&entry("Rust 2.0", "", ""), Some(&include)));
        assert!(!evaluate(&entry("Python", "", ""), Some(&include)));

        let not_match = FeedFilter::from_parts(Some("link"), Some("regex not match"), Some(r"/ads/"))
            .unwrap()
            .unwrap();
        assert!(!evaluate(&entry("", "", "https://a/ads/1"), Some(&not_match)));
        assert!(evaluate(&entry("", "", "https://a/news/1"), Some(&not_match)));

        assert_eq!(FilterMode::parse("regexMatch").unwrap(), FilterMode::RegexMatch);
    }

    #[test]
    fn partial_triple_is_a_configuration_error() {
        let err = FeedFilter::from_parts(Some("title"), Some(""), None).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn unsupported_values_are_configuration_errors() {
        assert!(matches!(
            FeedFilter::from_parts(Some("author"), Some("include"), Some("x")),
            Err(PipelineError::Configuration(_))
        ));
        assert!(matches!(
            FeedFilter::from_parts(Some("title"), Some("fuzzy"), Some("x")),
            Err(PipelineError::Configuration(_))
        ));
        assert!(matches!(
            FeedFilter::from_parts(Some("title"), Some("include"), Some("(unclosed")),
            Err(PipelineError::Configuration(_))
        ));
    }
}
