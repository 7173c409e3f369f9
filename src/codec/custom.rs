//! The `custom` part: note metadata as a small XML document.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <custom version="1.0">
//!  <color>yellow</color>
//!  <_ key="due date">2026-11-01</_>
//! </custom>
//! ```
//!
//! Keys that are valid XML names become element names. Any other key is
//! written as a `_` element with the key in its `key` attribute, so no
//! entry is ever dropped or produces a broken document.

use std::collections::BTreeMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, warn};

use super::{tagged_part, PartKind, CHARSET};
use crate::error::{NoteError, Result};
use crate::mime::{ContentType, MimePart};

/// Document element name.
pub const ROOT_ELEMENT: &str = "custom";
/// Value of the `version` attribute on the document element.
pub const FORMAT_VERSION: &str = "1.0";
/// Element used for keys that are not valid XML names.
pub const ESCAPED_ELEMENT: &str = "_";
const KEY_ATTRIBUTE: &str = "key";

/// Build the metadata part for `custom`.
pub fn encode_custom_part(custom: &BTreeMap<String, String>) -> Result<MimePart> {
    let document = write_custom_document(custom)?;
    let mut part = tagged_part(PartKind::CustomMetadata);
    let mut content_type = ContentType::new("text/xml");
    content_type.set_charset(CHARSET);
    part.set_content_type(content_type);
    part.set_body(document.into_bytes());
    Ok(part)
}

/// Read the metadata entries of a `custom` part.
///
/// Returns `None` (after logging why) if the document is malformed or its
/// document element is not `<custom>`.
pub fn decode_custom_part(part: &MimePart) -> Option<BTreeMap<String, String>> {
    let document = part.decoded_text();
    match read_custom_document(&document) {
        Ok(entries) => Some(entries),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable custom metadata part");
            debug!(body = %document, "Rejected custom metadata document");
            None
        }
    }
}

/// Serialize the metadata map to its XML document.
pub fn write_custom_document(custom: &BTreeMap<String, String>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_error)?;
    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("version", FORMAT_VERSION));
    writer.write_event(Event::Start(root)).map_err(write_error)?;

    for (key, value) in custom {
        let element = if is_xml_name(key) {
            key.as_str()
        } else {
            ESCAPED_ELEMENT
        };
        let mut start = BytesStart::new(element);
        if element == ESCAPED_ELEMENT && key != ESCAPED_ELEMENT {
            start.push_attribute((KEY_ATTRIBUTE, key.as_str()));
        }
        writer.write_event(Event::Start(start)).map_err(write_error)?;
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(write_error)?;
        writer
            .write_event(Event::End(BytesEnd::new(element)))
            .map_err(write_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))
        .map_err(write_error)?;

    String::from_utf8(writer.into_inner()).map_err(|e| NoteError::markup(e.to_string()))
}

/// Parse a metadata document. Each immediate child of `<custom>` becomes
/// one entry; the entry value is the concatenated text inside the child.
pub fn read_custom_document(xml: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = BTreeMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(positioned(xml, buffer_position(&reader), e.to_string())),
        };
        match event {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => {
                        check_root(&e, seen_root)?;
                        seen_root = true;
                    }
                    2 => current = Some((entry_key(&e)?, String::new())),
                    // Markup nested inside a value only contributes its text
                    _ => {}
                }
            }
            Event::Empty(e) => match depth {
                0 => {
                    check_root(&e, seen_root)?;
                    seen_root = true;
                }
                1 => {
                    entries.insert(entry_key(&e)?, String::new());
                }
                _ => {}
            },
            Event::End(_) => {
                if depth == 2 {
                    if let Some((key, value)) = current.take() {
                        entries.insert(key, value);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| positioned(xml, buffer_position(&reader), e.to_string()))?;
                match current.as_mut() {
                    Some((_, value)) if depth >= 2 => value.push_str(&text),
                    _ if !text.trim().is_empty() => {
                        debug!(text = %text, "Text outside of a metadata entry ignored");
                    }
                    _ => {}
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = current.as_mut().filter(|_| depth >= 2) {
                    value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if depth != 0 {
        return Err(positioned(
            xml,
            xml.len(),
            format!("document ends with {depth} unclosed element(s)"),
        ));
    }
    if !seen_root {
        return Err(NoteError::markup("document has no document element"));
    }
    Ok(entries)
}

/// `true` if `key` can be used as an element name as-is.
pub fn is_xml_name(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("xml"))
}

fn check_root(element: &BytesStart<'_>, seen_root: bool) -> Result<()> {
    if seen_root {
        return Err(NoteError::markup("more than one document element"));
    }
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    if name != ROOT_ELEMENT {
        return Err(NoteError::markup(format!(
            "document element is <{name}> instead of the expected <{ROOT_ELEMENT}>"
        )));
    }
    Ok(())
}

fn entry_key(element: &BytesStart<'_>) -> Result<String> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    if name != ESCAPED_ELEMENT {
        return Ok(name);
    }
    let attribute = element
        .try_get_attribute(KEY_ATTRIBUTE)
        .map_err(|e| NoteError::markup(e.to_string()))?;
    match attribute {
        Some(attr) => attr
            .unescape_value()
            .map(|v| v.into_owned())
            .map_err(|e| NoteError::markup(e.to_string())),
        None => Ok(name),
    }
}

#[allow(clippy::unnecessary_cast)]
fn buffer_position(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

/// Build a markup error with 1-based line and column for byte `offset`.
fn positioned(xml: &str, offset: usize, reason: String) -> NoteError {
    let prefix = xml.get(..offset.min(xml.len())).unwrap_or(xml);
    let line = prefix.matches('\n').count() + 1;
    let column = prefix
        .rfind('\n')
        .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count())
        + 1;
    NoteError::Markup {
        line,
        column,
        reason,
    }
}

fn write_error(e: impl std::fmt::Display) -> NoteError {
    NoteError::markup(format!("failed to write metadata document: {e}"))
}
