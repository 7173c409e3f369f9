//! Raw RFC 5322 bytes → [`MimeMessage`].
//!
//! `mail-parser` provides the part tree and the text of the main body.
//! Header blocks and the other leaf bodies are re-read from the raw bytes,
//! so custom headers and attachment payloads come back exactly as written.

use mail_parser::decoders::quoted_printable::quoted_printable_decode;
use mail_parser::{Message, MessageParser, MessagePart, PartType};
use tracing::warn;

use crate::error::{NoteError, Result};
use crate::mime::{ContentType, Disposition, MimeMessage, MimePart, TransferEncoding};
use crate::parser::header::{
    decode_base64_lenient, decode_encoded_words, decode_header_bytes, strip_angle_brackets,
    unfold_headers,
};

/// Maximum multipart nesting followed (to prevent stack overflow on adversarial input).
const MAX_DEPTH: usize = 10;

/// Parse a complete raw message (headers + body).
///
/// A leading mbox `From ` line or UTF-8 BOM is skipped.
pub fn parse_message(raw_message: &[u8]) -> Result<MimeMessage> {
    let message_bytes = skip_from_line(raw_message);

    let parsed = MessageParser::default()
        .parse(message_bytes)
        .ok_or_else(|| NoteError::Mime("input is not an RFC 5322 message".into()))?;
    let root = parsed
        .parts
        .first()
        .ok_or_else(|| NoteError::Mime("message has no parts".into()))?;

    Ok(MimeMessage::from_root(convert_part(
        &parsed,
        message_bytes,
        root,
        0,
        true,
    )))
}

/// Convert one part. `is_main` marks the part reached by following first
/// children from the root; only its text is taken from `mail-parser`.
fn convert_part(
    msg: &Message<'_>,
    raw: &[u8],
    part: &MessagePart<'_>,
    depth: usize,
    is_main: bool,
) -> MimePart {
    let mut out = MimePart::new();

    let (header_start, body_start) = header_span(part);
    let header_block = raw.get(header_start..body_start).unwrap_or_default();
    for (name, value) in unfold_headers(&decode_header_bytes(header_block)) {
        match name.to_ascii_lowercase().as_str() {
            "content-type" => {
                out.set_content_type(ContentType::parse(&decode_encoded_words(value.trim())))
            }
            "content-transfer-encoding" => match TransferEncoding::parse(&value) {
                Some(encoding) => out.set_transfer_encoding(encoding),
                None => warn!(encoding = %value, "Unknown Content-Transfer-Encoding"),
            },
            "content-disposition" => out.set_disposition(Disposition::parse(&value)),
            "content-id" => out.set_content_id(strip_angle_brackets(&value)),
            "mime-version" => {}
            _ => {
                let decoded = decode_encoded_words(value.trim());
                out.headers_mut().append(name, decoded);
            }
        }
    }

    match &part.body {
        PartType::Multipart(children) => {
            if depth >= MAX_DEPTH {
                warn!(depth, "Multipart nesting too deep, ignoring children");
                return out;
            }
            let children = children.iter().filter_map(|&id| msg.parts.get(id));
            for (index, child) in children.enumerate() {
                out.push_part(convert_part(msg, raw, child, depth + 1, is_main && index == 0));
            }
        }
        PartType::Text(text) | PartType::Html(text) if is_main => {
            // mail-parser has already converted the text to UTF-8
            if out.content_type().is_text() {
                out.content_type_mut().set_charset("utf-8");
            }
            out.set_body(text.as_bytes());
        }
        _ => {
            let body = match raw.get(body_span(part)) {
                Some(encoded) => decode_transfer(encoded, out.transfer_encoding()),
                None => part.contents().to_vec(),
            };
            out.set_body(body);
        }
    }

    out
}

/// Undo a leaf's transfer encoding. Bytes that do not decode are kept.
fn decode_transfer(encoded: &[u8], encoding: Option<TransferEncoding>) -> Vec<u8> {
    let decoded = match encoding {
        Some(TransferEncoding::Base64) => decode_base64_lenient(encoded),
        Some(TransferEncoding::QuotedPrintable) => quoted_printable_decode(encoded),
        _ => return encoded.to_vec(),
    };
    decoded.unwrap_or_else(|| {
        warn!(?encoding, "Body does not match its transfer encoding, keeping raw bytes");
        encoded.to_vec()
    })
}

/// Byte range of a part's header block within the raw message.
#[allow(clippy::unnecessary_cast)]
fn header_span(part: &MessagePart<'_>) -> (usize, usize) {
    (part.offset_header as usize, part.offset_body as usize)
}

/// Byte range of a leaf's encoded body within the raw message.
#[allow(clippy::unnecessary_cast)]
fn body_span(part: &MessagePart<'_>) -> std::ops::Range<usize> {
    part.offset_body as usize..part.offset_end as usize
}

/// Skip a leading UTF-8 BOM and mbox `From ` separator line.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
