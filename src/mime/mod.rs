//! In-memory MIME message model and its RFC 5322 serializer.
//!
//! Reading raw bytes into this model lives in [`crate::parser::mime`].

mod assemble;
pub mod message;
pub mod part;

pub use message::MimeMessage;
pub use part::{ContentType, Disposition, DispositionKind, Headers, MimePart, TransferEncoding};
