//! HTML cleanup applied to article bodies before they are sent for summarization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Elements dropped together with everything inside them.
const BLOCK_ELEMENTS: &[&str] = &["script", "style", "a", "video", "audio", "iframe"];

static BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    BLOCK_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid block regex"))
        .collect()
});

// Void elements plus any unclosed leftovers of the block elements above.
static LONE_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(img|input|script|style|a|video|audio|iframe)\b[^>]*>").expect("valid tag regex")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// Strip unsafe and non-textual elements and return the remaining text.
pub fn clean_html(html: &str) -> String {
    let mut cleaned = html.to_string();
    for block in BLOCKS.iter() {
        cleaned = block.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = LONE_TAGS.replace_all(&cleaned, "");
    let cleaned = ANY_TAG.replace_all(&cleaned, "");

    html_escape::decode_html_entities(&cleaned).trim().to_string()
}
