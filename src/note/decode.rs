//! Message → note.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{CLASSIFICATION_HEADER, LAST_MODIFIED_HEADER, UID_HEADER};
use crate::codec::attachment::decode_attachment_part;
use crate::codec::custom::decode_custom_part;
use crate::codec::PartKind;
use crate::mime::MimeMessage;
use crate::model::note::{Classification, Note, TextFormat};

/// Rebuild a note from `message`. `None` yields an empty note.
///
/// Decoding never fails: unreadable fields are left unset, malformed
/// metadata is skipped and parts with an unknown tag are ignored, each with
/// a log record.
pub fn decode(message: Option<&MimeMessage>) -> Note {
    let mut note = Note::new();
    let Some(msg) = message else {
        return note;
    };

    if let Some(subject) = msg.subject() {
        note.set_title(subject);
    }

    let body = msg.main_body_part();
    let format = if body.content_type().is("text/html") {
        TextFormat::Rich
    } else {
        TextFormat::Plain
    };
    note.set_text(body.decoded_text().trim_end(), format);

    if let Some(from) = msg.from() {
        note.set_from(from);
    }

    if let Some(date) = msg.date() {
        note.set_creation_date(date);
    } else if let Some(raw) = msg.header("Date") {
        warn!(date = raw, "Unparseable Date header, creation date left unset");
    }

    if let Some(raw) = msg.header(LAST_MODIFIED_HEADER) {
        match parse_last_modified(raw) {
            Some(date) => note.set_last_modified_date(date),
            None => warn!(date = raw, "Unparseable last-modified header, left unset"),
        }
    }

    if let Some(uid) = msg.header(UID_HEADER) {
        note.set_uid(uid);
    }

    note.set_classification(
        msg.header(CLASSIFICATION_HEADER)
            .map(Classification::from_header)
            .unwrap_or_default(),
    );

    for (index, part) in msg.contents().iter().enumerate() {
        match PartKind::of(part) {
            Some(PartKind::CustomMetadata) => {
                if let Some(entries) = decode_custom_part(part) {
                    note.custom_mut().extend(entries);
                }
            }
            Some(PartKind::Attachment) => note.attachments_mut().push(decode_attachment_part(part)),
            Some(PartKind::Unknown(tag)) => {
                warn!(index, tag = %tag, "Skipping part with unknown type");
            }
            None => debug!(index, "Untagged part skipped"),
        }
    }

    note
}

/// The last-modified header is always written by the encoder, so only
/// strict RFC 2822 is accepted.
fn parse_last_modified(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

impl Note {
    /// Rebuild a note from a parsed message.
    pub fn from_message(message: &MimeMessage) -> Self {
        decode(Some(message))
    }

    /// Parse raw message bytes and rebuild the note. Input that is not a
    /// message at all yields an empty note.
    pub fn from_bytes(raw: &[u8]) -> Self {
        match MimeMessage::parse(raw) {
            Ok(msg) => decode(Some(&msg)),
            Err(e) => {
                warn!(error = %e, "Input is not a message, returning an empty note");
                Note::new()
            }
        }
    }
}
