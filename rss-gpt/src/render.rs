//! RSS 2.0 output for a section's merged entry list.

use crate::types::{ChannelInfo, FeedEntry, PipelineError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const GENERATOR: &str = "rss-gpt";

pub struct FeedWriter;

impl FeedWriter {
    /// Render the whole document in memory. Output depends only on the inputs,
    /// so re-rendering reloaded history gives the same bytes.
    pub fn render(channel: &ChannelInfo, entries: &[FeedEntry]) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:content", CONTENT_NS)])),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new("channel")))?;
        text_element(&mut writer, "title", channel.title.as_deref().unwrap_or_default())?;
        text_element(&mut writer, "link", channel.link.as_deref().unwrap_or_default())?;
        text_element(&mut writer, "description", channel.description.as_deref().unwrap_or_default())?;
        text_element(&mut writer, "generator", GENERATOR)?;

        for entry in entries {
            write_item(&mut writer, entry)?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("channel")))?;
        emit(&mut writer, Event::End(BytesEnd::new("rss")))?;

        let mut document = String::from_utf8(writer.into_inner())
            .map_err(|e| PipelineError::Persist(format!("rendered feed is not UTF-8: {}", e)))?;
        document.push('\n');
        Ok(document)
    }

    /// Write `document` next to `path` and rename it into place, so a failed
    /// write never truncates the previous file.
    pub fn persist(path: &Path, document: &str) -> Result<()> {
        let tmp_path = path.with_extension("xml.tmp");
        debug!("Writing {} bytes to {}", document.len(), tmp_path.display());

        let write_result = fs::File::create(&tmp_path)
            .and_then(|mut file| file.write_all(document.as_bytes()).and_then(|_| file.sync_all()))
            .and_then(|_| fs::rename(&tmp_path, path));

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(PipelineError::Persist(format!("failed to write {}: {}", path.display(), e)));
        }
        Ok(())
    }
}

fn write_item<W: Write>(writer: &mut Writer<W>, entry: &FeedEntry) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new("item")))?;
    text_element(writer, "title", &entry.title)?;
    text_element(writer, "link", &entry.link)?;
    if !entry.link.is_empty() {
        emit(writer, Event::Start(BytesStart::new("guid").with_attributes([("isPermaLink", "false")])))?;
        emit(writer, Event::Text(BytesText::new(&entry.link)))?;
        emit(writer, Event::End(BytesEnd::new("guid")))?;
    }
    if let Some(published) = entry.published {
        text_element(writer, "pubDate", &published.to_rfc2822())?;
    }
    if let Some(summary) = entry.summary.text() {
        text_element(writer, "description", summary)?;
    }
    text_element(writer, "content:encoded", &entry.article)?;
    emit(writer, Event::End(BytesEnd::new("item")))
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| PipelineError::Persist(format!("failed to render feed: {}", e)))
}
