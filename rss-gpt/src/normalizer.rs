use crate::sanitize::clean_html;
use crate::types::{FeedEntry, RawEntry, SummaryState};
use crate::utils::text::{non_blank, truncate_chars};
use crate::utils::url::strip_fragment;

const TITLE_EXCERPT_CHARS: usize = 50;
const UNTITLED: &str = "Untitled";

/// Derive the canonical title, article body and link of a raw entry.
pub fn normalize(raw: RawEntry) -> FeedEntry {
    let link = strip_fragment(raw.link.trim()).to_string();
    let body = non_blank(raw.content.as_deref()).or_else(|| non_blank(raw.description.as_deref()));
    let title = derive_title(raw.title.as_deref(), body, &link);
    let article = body.map(str::to_string).unwrap_or_else(|| title.clone());

    FeedEntry {
        link,
        title,
        article,
        summary: SummaryState::Absent,
        published: raw.published,
    }
}

/// Own title, else an excerpt of the body text, else the link.
pub fn derive_title(title: Option<&str>, body: Option<&str>, link: &str) -> String {
    if let Some(title) = non_blank(title) {
        return title.to_string();
    }

    let excerpt = body
        .map(clean_html)
        .map(|text| truncate_chars(&text, TITLE_EXCERPT_CHARS).trim().to_string())
        .filter(|text| !text.is_empty());

    excerpt.unwrap_or_else(|| {
        if link.is_empty() {
            UNTITLED.to_string()
        } else {
            link.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>, link: &str, content: Option<&str>, description: Option<&str>) -> RawEntry {
        RawEntry {
            title: title.map(str::to_string),
            link: link.to_string(),
            content: content.map(str::to_string),
            description: description.map(str::to_string),
            published: None,
        }
    }

    #[test]
    fn reply_fragment_is_removed_from_link() {
        let entry = normalize(raw(Some("Topic"), "https://v2ex.com/t/123#reply5", None, None));
        assert_eq!(entry.link, "https://v2ex.com/t/123");
    }

    #[test]
    fn content_wins_over_description() {
        let entry = normalize(raw(Some("T"), "https://a/1", Some("<p>full</p>"), Some("short")));
        assert_eq!(entry.article, "<p>full</p>");

        let entry = normalize(raw(Some("T"), "https://a/1", Some("   "), Some("short")));
        assert_eq!(entry.article, "short");
    }

    #[test]
    fn article_falls_back_to_title() {
        let entry = normalize(raw(Some("Only a title"), "https://a/1", None, None));
        assert_eq!(entry.article, "Only a title");
        assert_eq!(entry.summary, SummaryState::Absent);
    }

    #[test]
    fn missing_title_uses_body_excerpt() {
        let body = "x".repeat(80);
        let entry = normalize(raw(None, "https://a/1", None, Some(&body)));
        assert_eq!(entry.title.chars().count(), 50);
    }

    #[test]
    fn missing_title_and_body_uses_link() {
        let entry = normalize(raw(Some(""), "https://a/1", None, None));
        assert_eq!(entry.title, "https://a/1");
        assert_eq!(entry.article, "https://a/1");
    }

    #[test]
    fn nothing_at_all_is_still_titled() {
        let entry = normalize(raw(None, "", None, None));
        assert_eq!(entry.title, "Untitled");
        assert!(!entry.article.is_empty());
    }
}
