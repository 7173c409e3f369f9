//! Reading messages: RFC 5322 parsing, header decoding and `.eml` files.

pub mod eml;
pub mod header;
pub mod mime;
