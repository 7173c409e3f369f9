//! Serialization of a [`MimeMessage`] to RFC 5322 bytes.
//!
//! Output uses CRLF line endings. Header values that are not plain
//! printable ASCII are written as RFC 2047 `B` encoded-words. Leaf bodies
//! are written verbatim when they are 7-bit clean, otherwise base64 wrapped
//! at 76 columns. Multipart boundaries are derived from the content, so the
//! same message always assembles to the same bytes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::message::MimeMessage;
use super::part::{MimePart, TransferEncoding};

const CRLF: &[u8] = b"\r\n";
const BASE64_LINE: usize = 76;
const MAX_LINE: usize = 998;
/// Raw bytes per encoded-word, keeps each word under 75 characters.
const WORD_CHUNK: usize = 45;

impl MimeMessage {
    /// Serialize to transportable bytes.
    pub fn assemble(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(estimate_size(self.root()));
        write_part(self.root(), &mut out, 0, true);
        out.extend_from_slice(CRLF);
        out
    }
}

fn estimate_size(part: &MimePart) -> usize {
    512 + part.body().len() * 4 / 3 + part.parts().iter().map(estimate_size).sum::<usize>()
}

fn write_part(part: &MimePart, out: &mut Vec<u8>, depth: usize, is_root: bool) {
    for (name, value) in part.headers().iter() {
        write_header(out, name, value);
    }
    if is_root {
        write_header(out, "MIME-Version", "1.0");
    }

    if part.is_multipart() {
        let boundary = choose_boundary(part, depth);
        let mut content_type = part.content_type().clone();
        content_type.set_param("boundary", boundary.clone());
        write_header(out, "Content-Type", &content_type.to_header_value());
        write_content_headers(part, None, out);
        out.extend_from_slice(CRLF);

        for (i, child) in part.parts().iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(CRLF);
            }
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            write_part(child, out, depth + 1, false);
        }
        out.extend_from_slice(format!("\r\n--{boundary}--").as_bytes());
        return;
    }

    let encoding = effective_encoding(part);
    let mut content_type = part.content_type().clone();
    content_type.remove_param("boundary");
    write_header(out, "Content-Type", &content_type.to_header_value());
    write_content_headers(part, Some(encoding), out);
    out.extend_from_slice(CRLF);
    write_body(part, encoding, out);
}

fn write_content_headers(part: &MimePart, encoding: Option<TransferEncoding>, out: &mut Vec<u8>) {
    if let Some(encoding) = encoding {
        write_header(out, "Content-Transfer-Encoding", encoding.as_str());
    }
    if let Some(disposition) = part.disposition() {
        write_header(out, "Content-Disposition", &disposition.to_header_value());
    }
    if let Some(id) = part.content_id() {
        write_header(out, "Content-ID", &format!("<{id}>"));
    }
}

/// The encoding actually used on the wire for a leaf part.
///
/// A pre-encoded body keeps its declared encoding. Otherwise 7bit/8bit/binary
/// are honored only when the body fits the 7-bit line rules, and everything
/// else (including quoted-printable, which is never produced) becomes base64.
fn effective_encoding(part: &MimePart) -> TransferEncoding {
    if part.is_body_encoded() {
        return part.transfer_encoding().unwrap_or(TransferEncoding::Base64);
    }
    match part.transfer_encoding() {
        Some(TransferEncoding::Base64) => TransferEncoding::Base64,
        Some(TransferEncoding::QuotedPrintable) => TransferEncoding::Base64,
        _ if is_seven_bit_clean(part.body()) => TransferEncoding::SevenBit,
        _ => TransferEncoding::Base64,
    }
}

fn is_seven_bit_clean(body: &[u8]) -> bool {
    body.iter().all(|&b| b.is_ascii() && b != 0 && b != b'\r')
        && body.split(|&b| b == b'\n').all(|line| line.len() <= MAX_LINE)
}

fn write_body(part: &MimePart, encoding: TransferEncoding, out: &mut Vec<u8>) {
    if part.is_body_encoded() || encoding != TransferEncoding::Base64 {
        out.extend_from_slice(part.body());
        return;
    }
    let encoded = STANDARD.encode(part.body());
    for (i, line) in encoded.as_bytes().chunks(BASE64_LINE).enumerate() {
        if i > 0 {
            out.extend_from_slice(CRLF);
        }
        out.extend_from_slice(line);
    }
}

/// Pick a boundary that does not occur in any descendant body.
fn choose_boundary(part: &MimePart, depth: usize) -> String {
    let mut hasher = DefaultHasher::new();
    hash_content(part, &mut hasher);
    let mut boundary = format!("=_notemime_{depth}_{:016x}", hasher.finish());
    while contains_in_bodies(part, boundary.as_bytes()) {
        boundary.push('_');
    }
    boundary
}

fn hash_content(part: &MimePart, hasher: &mut DefaultHasher) {
    part.body().hash(hasher);
    for (name, value) in part.headers().iter() {
        name.hash(hasher);
        value.hash(hasher);
    }
    for child in part.parts() {
        hash_content(child, hasher);
    }
}

fn contains_in_bodies(part: &MimePart, needle: &[u8]) -> bool {
    part.body().windows(needle.len()).any(|w| w == needle)
        || part.parts().iter().any(|c| contains_in_bodies(c, needle))
}

fn write_header(out: &mut Vec<u8>, name: &str, value: &str) {
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(encode_header_value(value).as_bytes());
    out.extend_from_slice(CRLF);
}

/// Encode a header value for the wire.
///
/// Printable ASCII is kept as-is. Anything else (non-ASCII, control
/// characters, leading or trailing whitespace that unfolding would lose, or
/// text that looks like an encoded-word) becomes a folded sequence of UTF-8
/// `B` encoded-words.
pub(crate) fn encode_header_value(value: &str) -> String {
    let plain = value.bytes().all(|b| (0x20..0x7f).contains(&b))
        && !value.contains("=?")
        && value.trim() == value;
    if plain {
        return value.to_string();
    }

    let mut words = Vec::new();
    let mut start = 0;
    while start < value.len() {
        let mut end = (start + WORD_CHUNK).min(value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        words.push(format!(
            "=?utf-8?B?{}?=",
            STANDARD.encode(&value.as_bytes()[start..end])
        ));
        start = end;
    }
    words.join("\r\n ")
}
