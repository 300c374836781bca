use crate::types::{ChannelInfo, ParsedFeed, PipelineError, RawEntry, Result};
use feed_rs::parser;
use tracing::{debug, info, warn};

pub struct FeedParser;

impl FeedParser {
    /// Parse an RSS, Atom or JSON feed document. Malformed XML gets one retry
    /// after [`cleanup_xml`].
    pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = match parser::parse(content) {
            Ok(feed) => feed,
            Err(first_err) => {
                let text = String::from_utf8_lossy(content);
                let cleaned = cleanup_xml(&text);
                if !(cleaned.contains("<rss") || cleaned.contains("<feed") || cleaned.contains("<rdf")) {
                    return Err(PipelineError::Parse(format!("Not an RSS or Atom feed: {}", first_err)));
                }
                let feed = parser::parse(cleaned.as_bytes()).map_err(|second_err| {
                    PipelineError::Parse(format!(
                        "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                        first_err, second_err
                    ))
                })?;
                warn!("Feed parsed successfully after XML cleanup");
                feed
            }
        };

        let channel = ChannelInfo {
            title: feed.title.map(|t| t.content),
            description: feed.description.map(|d| d.content),
            link: feed.links.first().map(|l| l.href.clone()),
        };

        let entries: Vec<RawEntry> = feed.entries.into_iter().map(Self::parse_entry).collect();

        info!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { channel, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> RawEntry {
        RawEntry {
            title: entry.title.map(|t| t.content),
            link: entry.links.first().map(|l| l.href.clone()).unwrap_or_default(),
            content: entry.content.and_then(|c| c.body),
            description: entry.summary.map(|s| s.content),
            published: entry.published.or(entry.updated),
        }
    }
}

/// Clean up malformed XML
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().trim_start_matches('\u{FEFF}').to_string();

    // Drop anything before the document proper
    if let Some(start) = ["<?xml", "<rss", "<feed", "<rdf"].iter().filter_map(|tag| cleaned.find(tag)).min() {
        cleaned = cleaned[start..].to_string();
    }

    // HTML entities that are not defined in XML
    cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&hellip;", "&#8230;")
        .replace("&amp;amp;", "&amp;");

    cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' |
                '\u{000A}' |
                '\u{000D}' |
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect()
}
