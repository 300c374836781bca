//! The published index page and the link list kept at the end of the READMEs.

use crate::config::RawSection;
use crate::types::Result;
use crate::utils::text::non_blank;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// A section as it appears on the index page and in the README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionListing {
    pub name: String,
    pub urls: Vec<String>,
}

impl SectionListing {
    /// Listed whether or not the section run succeeded, as long as it has a
    /// name and at least one URL.
    pub fn from_raw(raw: &RawSection) -> Option<Self> {
        let name = non_blank(raw.name.as_deref())?.to_string();
        let urls = raw.urls();
        if urls.is_empty() {
            return None;
        }
        Some(Self { name, urls })
    }
}

/// Where a section's generated feed is served.
pub fn feed_url(deployment_url: Option<&str>, name: &str) -> String {
    format!("{}{}.xml", deployment_url.unwrap_or_default(), name)
}

pub fn render_index(listings: &[SectionListing], deployment_url: Option<&str>, updated_at: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>RSS-GPT</title>\n</head>\n<body>\n");
    html.push_str("  <h1>RSS-GPT</h1>\n");
    let _ = writeln!(html, "  <p>Last updated: {}</p>", encode_text(updated_at));
    html.push_str("  <ul>\n");

    for listing in listings {
        let feed = feed_url(deployment_url, &listing.name);
        let _ = writeln!(
            html,
            "    <li>\n      <a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(&feed),
            encode_text(&listing.name)
        );
        html.push_str("      <ul>\n");
        for url in &listing.urls {
            let _ = writeln!(
                html,
                "        <li><a href=\"{}\">{}</a></li>",
                encode_double_quoted_attribute(url),
                encode_text(url)
            );
        }
        html.push_str("      </ul>\n    </li>\n");
    }

    html.push_str("  </ul>\n</body>\n</html>\n");
    html
}

pub fn write_index(base: &Path, html: &str) -> Result<()> {
    let path = base.join("index.html");
    fs::write(&path, html)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// One `- url1, url2 -> feed` line per section.
pub fn readme_links(listings: &[SectionListing], deployment_url: Option<&str>) -> Vec<String> {
    listings
        .iter()
        .map(|listing| format!("- {} -> {}", listing.urls.join(", "), feed_url(deployment_url, &listing.name)))
        .collect()
}

/// Replace the trailing link block of a README with `links`.
pub fn append_readme(path: &Path, links: &[String]) -> Result<()> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("README {} not found, skipping link update", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut lines: Vec<&str> = content.lines().collect();
    while lines
        .last()
        .is_some_and(|line| line.starts_with("- ") || line.trim().is_empty())
    {
        lines.pop();
    }
    lines.push("");
    lines.extend(links.iter().map(String::as_str));

    let mut updated = lines.join("\n");
    updated.push('\n');
    fs::write(path, updated)?;
    info!("Updated feed links in {}", path.display());
    Ok(())
}
