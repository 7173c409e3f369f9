//! Note → message.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::entropy::{Clock, RandomUid, SystemClock, UidSource};
use super::{
    CLASSIFICATION_HEADER, DEFAULT_TITLE, EMPTY_BODY_PLACEHOLDER, LAST_MODIFIED_HEADER, UID_HEADER,
};
use crate::codec::attachment::encode_attachment_part;
use crate::codec::custom::encode_custom_part;
use crate::codec::CHARSET;
use crate::mime::{ContentType, MimeMessage};
use crate::model::note::Note;

/// Tunables for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Subject used when the note has no title.
    pub default_title: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Encodes notes into messages.
///
/// Missing uid and timestamps are filled from the encoder's [`UidSource`]
/// and [`Clock`]. Pin both to get byte-identical output.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use notemime::model::note::Note;
/// use notemime::note::encode::NoteEncoder;
/// use notemime::note::entropy::{FixedClock, FixedUid};
///
/// let encoder = NoteEncoder::with_entropy(
///     FixedClock(Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()),
///     FixedUid("4b2a7c1e-0000-4000-8000-000000000001".into()),
/// );
/// let msg = encoder.encode(&Note::new());
/// assert_eq!(msg.subject(), Some("New Note"));
/// assert_eq!(msg.header("X-Akonotes-UID"), Some("4b2a7c1e-0000-4000-8000-000000000001"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NoteEncoder<C = SystemClock, U = RandomUid> {
    clock: C,
    uids: U,
    options: EncodeOptions,
}

impl NoteEncoder {
    /// Encoder using the system clock and random UUIDs.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock, U: UidSource> NoteEncoder<C, U> {
    pub fn with_entropy(clock: C, uids: U) -> Self {
        Self {
            clock,
            uids,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Build the message for `note`.
    ///
    /// Attachments become one part each, in order, followed by a single
    /// metadata part when the note has custom entries.
    pub fn encode(&self, note: &Note) -> MimeMessage {
        let title = if note.title().is_empty() {
            self.options.default_title.as_str()
        } else {
            note.title()
        };
        // The main part must never be empty
        let text = if note.text().is_empty() {
            EMPTY_BODY_PLACEHOLDER
        } else {
            note.text()
        };
        let creation_date = note.creation_date().unwrap_or_else(|| self.clock.now());
        let last_modified_date = note
            .last_modified_date()
            .unwrap_or_else(|| self.clock.now());
        let uid = if note.uid().is_empty() {
            self.uids.generate()
        } else {
            note.uid().to_string()
        };

        let mut msg = MimeMessage::new();
        msg.set_subject(title);
        msg.set_date(creation_date);
        msg.set_from(note.from());
        msg.set_header(LAST_MODIFIED_HEADER, format_date(last_modified_date));
        msg.set_header(UID_HEADER, uid);
        msg.set_header(CLASSIFICATION_HEADER, note.classification().as_str());

        for attachment in note.attachments() {
            msg.add_part(encode_attachment_part(attachment));
        }

        if !note.custom().is_empty() {
            match encode_custom_part(note.custom()) {
                Ok(part) => msg.add_part(part),
                Err(e) => warn!(error = %e, "Failed to encode custom metadata, part omitted"),
            }
        }

        let mut content_type = ContentType::new(note.text_format().mime_type());
        content_type.set_charset(CHARSET);
        let body = msg.main_body_part_mut();
        body.set_content_type(content_type);
        body.set_body(text.as_bytes());

        msg
    }

    /// Encode and serialize in one step.
    pub fn encode_to_bytes(&self, note: &Note) -> Vec<u8> {
        self.encode(note).assemble()
    }
}

/// Format a timestamp the way the last-modified header stores it,
/// e.g. `Sat, 17 Oct 2026 10:00:00 +0000`.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc2822()
}

impl Note {
    /// Assemble the message for this note using the system clock and random
    /// UUIDs for anything unset.
    pub fn message(&self) -> MimeMessage {
        NoteEncoder::new().encode(self)
    }
}
