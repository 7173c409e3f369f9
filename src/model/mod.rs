//! Core data model types: the note record and its attachments.

pub mod attachment;
pub mod note;

/// MIME type identifying note items.
pub fn note_mime_type() -> &'static str {
    "text/x-vnd.akonadi.note"
}

/// Icon name associated with notes.
pub fn note_icon_name() -> &'static str {
    "text-plain"
}
