//! The note ↔ message mapping.
//!
//! A note travels as a MIME message whose main part is the note text.
//! Identity, timestamps and classification ride in `X-Akonotes-*` headers
//! on the root; attachments and metadata follow as tagged sub-parts
//! (see [`crate::codec`]).

pub mod decode;
pub mod encode;
pub mod entropy;
pub mod plain;

/// Root header holding the note UID.
pub const UID_HEADER: &str = "X-Akonotes-UID";
/// Root header holding the last-modified timestamp (RFC 2822).
pub const LAST_MODIFIED_HEADER: &str = "X-Akonotes-LastModified";
/// Root header holding the classification.
pub const CLASSIFICATION_HEADER: &str = "X-Akonotes-Classification";

/// Subject written for notes without a title.
pub const DEFAULT_TITLE: &str = "New Note";
/// Body written for notes without text.
pub const EMPTY_BODY_PLACEHOLDER: &str = "  ";
