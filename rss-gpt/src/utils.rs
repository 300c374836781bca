/// Text processing utilities
pub mod text {
    /// Return at most `max_chars` characters of `text`, cut on a char boundary.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// First `max_chars` characters followed by an ellipsis marker.
    pub fn excerpt(text: &str, max_chars: usize) -> String {
        format!("{}...", truncate_chars(text, max_chars))
    }

    /// Treat blank strings as missing.
    pub fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Drop everything from the first `#` on. Empty links stay empty.
    pub fn strip_fragment(link: &str) -> &str {
        match link.split_once('#') {
            Some((base, _)) => base,
            None => link,
        }
    }

    /// Only http(s) URLs are fetched.
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}
