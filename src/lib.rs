//! `notemime` — notes stored as MIME messages.
//!
//! A [`Note`] (title, text, timestamps, classification, attachments and
//! key/value metadata) maps to an RFC 5322 message and back. Encoding is
//! [`NoteEncoder::encode`] (or [`Note::message`]); decoding is
//! [`Note::from_message`] / [`Note::from_bytes`] and never fails.

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod mime;
pub mod model;
pub mod note;
pub mod parser;

pub use error::{NoteError, Result};
pub use mime::MimeMessage;
pub use model::attachment::{Attachment, AttachmentOrigin};
pub use model::note::{Classification, Note, TextFormat};
pub use model::{note_icon_name, note_mime_type};
pub use note::encode::{EncodeOptions, NoteEncoder};
