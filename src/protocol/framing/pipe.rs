//! Line-oriented framing used by the metadata pipe
//!
//! A record looks like
//!
//! ```text
//! <item><type>73736e63</type><code>736e7561</code><length>15</length>
//! <data encoding="base64">
//! QWlyUGxheS8zNzEuNC43</data></item>
//! ```
//!
//! Lines are trimmed and concatenated until one ends with `</item>`.

use bytes::BytesMut;

use super::Framer;
use crate::error::FramingError;
use crate::protocol::metadata::{Category, FourCc, Item};

/// Largest record the framer will buffer before giving up on it
pub const MAX_RECORD_SIZE: usize = 32 * 1024 * 1024;

const ITEM_OPEN: &str = "<item>";
const ITEM_CLOSE: &str = "</item>";

/// Accumulates pipe lines into records
#[derive(Debug, Default)]
pub struct PipeFramer {
    /// Bytes after the last newline
    partial: BytesMut,
    /// Trimmed lines of the record being assembled
    record: String,
    /// The current line overflowed; drop it up to the next newline
    skipping: bool,
}

impl PipeFramer {
    /// Create an empty framer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (with or without its line terminator)
    ///
    /// Returns up to two items: when a record opens before the previous one
    /// was closed, the dangling record is parsed with a synthesized
    /// `</item>` first.
    pub fn push_line(&mut self, line: &str) -> Vec<Item> {
        let line = line.trim();
        let mut items = Vec::new();

        if line.starts_with(ITEM_OPEN) && !self.record.is_empty() {
            let mut dangling = std::mem::take(&mut self.record);
            dangling.push_str(ITEM_CLOSE);
            tracing::debug!(len = dangling.len(), "Closing truncated pipe record");
            items.extend(Self::parse_or_warn(&dangling));
        }

        if self.record.len() + line.len() > MAX_RECORD_SIZE {
            tracing::warn!(
                "Dropping pipe record: {}",
                FramingError::RecordTooLarge {
                    size: self.record.len() + line.len()
                }
            );
            self.record.clear();
            return items;
        }
        self.record.push_str(line);

        if line.ends_with(ITEM_CLOSE) {
            let record = std::mem::take(&mut self.record);
            items.extend(Self::parse_or_warn(&record));
        }

        items
    }

    /// Whether a record is partially buffered
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.record.is_empty() || !self.partial.is_empty()
    }

    fn parse_or_warn(record: &str) -> Option<Item> {
        match parse_record(record) {
            Ok(item) => {
                tracing::trace!(
                    category = %item.category(),
                    code = %item.code(),
                    len = item.len(),
                    "Pipe item"
                );
                Some(item)
            }
            Err(e) => {
                tracing::warn!("Can not parse pipe record: {}", e);
                None
            }
        }
    }
}

impl Framer for PipeFramer {
    fn push(&mut self, frame: &[u8]) -> Vec<Item> {
        // Only the new bytes can hold the next newline
        let mut from = self.partial.len();
        self.partial.extend_from_slice(frame);

        let mut items = Vec::new();
        while let Some(pos) = self.partial[from..].iter().position(|&b| b == b'\n') {
            let line = self.partial.split_to(from + pos + 1);
            from = 0;
            if std::mem::take(&mut self.skipping) {
                continue;
            }
            let text = String::from_utf8_lossy(&line);
            items.extend(self.push_line(&text));
        }

        if self.partial.len() > MAX_RECORD_SIZE {
            tracing::warn!(
                "Dropping pipe line: {}",
                FramingError::RecordTooLarge {
                    size: self.partial.len()
                }
            );
            self.partial.clear();
            self.skipping = true;
        }

        items
    }

    fn reset(&mut self) {
        self.partial.clear();
        self.record.clear();
        self.skipping = false;
    }
}

/// Parse one complete `<item>...</item>` record
///
/// # Errors
/// Returns `FramingError` if a required element is missing or malformed.
pub fn parse_record(record: &str) -> Result<Item, FramingError> {
    let body = record
        .trim()
        .strip_prefix(ITEM_OPEN)
        .and_then(|r| r.strip_suffix(ITEM_CLOSE))
        .ok_or(FramingError::NotAnItem)?;

    let category = FourCc::from_hex(element(body, "type").ok_or(FramingError::MissingField("type"))?)?;
    let category = Category::try_from(category)?;
    let code = FourCc::from_hex(element(body, "code").ok_or(FramingError::MissingField("code"))?)?;

    let length = element(body, "length").ok_or(FramingError::MissingField("length"))?;
    let length: usize = length
        .trim()
        .parse()
        .map_err(|_| FramingError::InvalidLength(length.to_string()))?;

    match data_element(body)? {
        Some(text) if !text.trim().is_empty() => Item::from_base64(category, code, length, text),
        _ => Ok(Item::new(category, code, length, None)?),
    }
}

/// Text between `<name>` and `</name>`
fn element<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = body.find(&open)? + open.len();
    let end = start + body[start..].find(&close)?;
    Some(&body[start..end])
}

/// Text of the optional `<data encoding="...">` element
///
/// Only base64 is ever produced by shairport-sync.
fn data_element(body: &str) -> Result<Option<&str>, FramingError> {
    let Some(start) = body.find("<data") else {
        return Ok(None);
    };
    let rest = &body[start + "<data".len()..];
    let tag_end = rest.find('>').ok_or(FramingError::MissingField("data"))?;
    let attributes = &rest[..tag_end];
    let content = &rest[tag_end + 1..];
    let end = content.find("</data>").ok_or(FramingError::MissingField("data"))?;

    let encoding = attribute(attributes, "encoding").ok_or(FramingError::MissingField("encoding"))?;
    if encoding != "base64" {
        return Err(FramingError::UnsupportedEncoding(encoding.to_string()));
    }

    Ok(Some(&content[..end]))
}

fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    let start = attributes.find(name)? + name.len();
    let rest = attributes[start..].trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    Some(&rest[..rest.find(quote)?])
}
