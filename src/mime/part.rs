//! A single MIME entity: headers, typed content fields, body and child parts.

use std::borrow::Cow;

use crate::parser::header::{decode_base64_lenient, decode_charset};

/// Ordered header list with case-insensitive lookup.
///
/// Content-Type, Content-Transfer-Encoding, Content-Disposition and
/// Content-ID are typed fields of [`MimePart`] and never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// First value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first value for `name` (dropping any duplicates), or
    /// append it if the header is absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(pos) => {
                self.entries[pos].1 = value;
                let mut i = pos + 1;
                while i < self.entries.len() {
                    if self.entries[i].0.eq_ignore_ascii_case(&name) {
                        self.entries.remove(i);
                    } else {
                        i += 1;
                    }
                }
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Append a header, keeping existing values with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Remove every value for `name`. Returns `true` if anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `Content-Type` value: a MIME type plus parameters.
///
/// The type keeps the case it was given; comparisons are case-insensitive.
/// A value read from a header also keeps that header text, returned by
/// [`ContentType::header_text`] until the value is modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    mime_type: String,
    params: Vec<(String, String)>,
    source: Option<String>,
}

impl Default for ContentType {
    /// `text/plain`, the RFC 2045 default.
    fn default() -> Self {
        Self::new("text/plain")
    }
}

impl ContentType {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            params: Vec::new(),
            source: None,
        }
    }

    /// Parse a raw header value such as `text/plain; charset="utf-8"`.
    ///
    /// An empty value gives an empty type rather than the `text/plain`
    /// default, so that what was written can be read back.
    pub fn parse(raw: &str) -> Self {
        let mut segments = split_params(raw).into_iter();
        let mime_type = segments
            .next()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let params = segments.filter_map(|seg| parse_param(&seg)).collect();
        Self {
            mime_type,
            params,
            source: Some(raw.to_string()),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Case-insensitive comparison of the bare type.
    pub fn is(&self, mime_type: &str) -> bool {
        self.mime_type.eq_ignore_ascii_case(mime_type)
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.mime_type = mime_type.into();
        self.source = None;
    }

    /// The header text this value was parsed from, or the rendered value.
    pub fn header_text(&self) -> Cow<'_, str> {
        match &self.source {
            Some(raw) => Cow::Borrowed(raw),
            None => Cow::Owned(self.to_header_value()),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .params
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.params.push((name.to_string(), value)),
        }
        self.source = None;
    }

    pub fn remove_param(&mut self, name: &str) {
        let before = self.params.len();
        self.params.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        if self.params.len() != before {
            self.source = None;
        }
    }

    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.set_param("charset", charset);
    }

    pub fn is_multipart(&self) -> bool {
        self.mime_type
            .get(..10)
            .is_some_and(|p| p.eq_ignore_ascii_case("multipart/"))
    }

    pub fn is_text(&self) -> bool {
        self.mime_type
            .get(..5)
            .is_some_and(|p| p.eq_ignore_ascii_case("text/"))
    }

    /// Render as a header value, quoting parameters when required.
    pub fn to_header_value(&self) -> String {
        let mut out = self.mime_type.clone();
        for (name, value) in &self.params {
            out.push_str("; ");
            out.push_str(name);
            out.push('=');
            out.push_str(&quote_param(value));
        }
        out
    }
}

/// `Content-Transfer-Encoding` mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    QuotedPrintable,
    Base64,
    Binary,
}

impl TransferEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
            Self::Binary => "binary",
        }
    }

    /// Parse a header value; unknown mechanisms yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "7bit" => Some(Self::SevenBit),
            "8bit" => Some(Self::EightBit),
            "quoted-printable" => Some(Self::QuotedPrintable),
            "base64" => Some(Self::Base64),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionKind {
    Inline,
    Attachment,
}

/// `Content-Disposition` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub kind: DispositionKind,
    pub filename: Option<String>,
}

impl Disposition {
    pub fn attachment(filename: impl Into<String>) -> Self {
        Self {
            kind: DispositionKind::Attachment,
            filename: Some(filename.into()),
        }
    }

    /// Parse a raw header value such as `attachment; filename="a.txt"`.
    pub fn parse(raw: &str) -> Self {
        let mut segments = split_params(raw).into_iter();
        let kind = match segments.next() {
            Some(k) if k.trim().eq_ignore_ascii_case("attachment") => DispositionKind::Attachment,
            _ => DispositionKind::Inline,
        };
        let filename = segments
            .filter_map(|seg| parse_param(&seg))
            .find(|(k, _)| k.eq_ignore_ascii_case("filename"))
            .map(|(_, v)| v);
        Self { kind, filename }
    }

    pub fn to_header_value(&self) -> String {
        let kind = match self.kind {
            DispositionKind::Inline => "inline",
            DispositionKind::Attachment => "attachment",
        };
        match &self.filename {
            Some(name) => format!("{kind}; filename={}", quote_param(name)),
            None => kind.to_string(),
        }
    }
}

/// One MIME entity.
///
/// The body is held decoded (raw bytes) unless it was supplied with
/// [`MimePart::set_encoded_body`], in which case it is already in the final
/// transfer encoding and is written out verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimePart {
    headers: Headers,
    content_type: ContentType,
    transfer_encoding: Option<TransferEncoding>,
    disposition: Option<Disposition>,
    content_id: Option<String>,
    body: Vec<u8>,
    body_encoded: bool,
    parts: Vec<MimePart>,
}

impl MimePart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Shortcut for `headers().get(name)`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn content_type_mut(&mut self) -> &mut ContentType {
        &mut self.content_type
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }

    /// The declared transfer encoding, or `None` to let the assembler pick.
    pub fn transfer_encoding(&self) -> Option<TransferEncoding> {
        self.transfer_encoding
    }

    pub fn set_transfer_encoding(&mut self, encoding: TransferEncoding) {
        self.transfer_encoding = Some(encoding);
    }

    pub fn disposition(&self) -> Option<&Disposition> {
        self.disposition.as_ref()
    }

    pub fn set_disposition(&mut self, disposition: Disposition) {
        self.disposition = Some(disposition);
    }

    /// Content identifier without angle brackets.
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn set_content_id(&mut self, id: impl Into<String>) {
        self.content_id = Some(id.into());
    }

    /// The body as stored (encoded if [`MimePart::is_body_encoded`]).
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set the raw (decoded) body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.body_encoded = false;
    }

    /// Set a body that is already in the declared transfer encoding.
    pub fn set_encoded_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.body_encoded = true;
    }

    pub fn is_body_encoded(&self) -> bool {
        self.body_encoded
    }

    /// Body with the transfer encoding undone.
    ///
    /// Only base64 is reversed; an undecodable base64 body is returned as-is.
    pub fn decoded_content(&self) -> Vec<u8> {
        if self.body_encoded && self.transfer_encoding == Some(TransferEncoding::Base64) {
            if let Some(decoded) = decode_base64_lenient(&self.body) {
                return decoded;
            }
            tracing::warn!("Body declared as base64 does not decode, using raw bytes");
        }
        self.body.clone()
    }

    /// Decoded body interpreted in the part's charset (UTF-8 by default).
    pub fn decoded_text(&self) -> String {
        let charset = self.content_type.charset().unwrap_or("utf-8");
        decode_charset(charset, &self.decoded_content())
    }

    /// Set a text body, declaring UTF-8.
    pub fn set_text(&mut self, text: &str) {
        self.content_type.set_charset("utf-8");
        self.set_body(text.as_bytes());
    }

    /// A container: a multipart type with at least one child. A multipart
    /// type without children is a leaf and keeps its body.
    pub fn is_multipart(&self) -> bool {
        self.content_type.is_multipart() && !self.parts.is_empty()
    }

    /// Child parts (empty for leaf parts).
    pub fn parts(&self) -> &[MimePart] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut Vec<MimePart> {
        &mut self.parts
    }

    /// Append a child part without touching the content type.
    pub fn push_part(&mut self, part: MimePart) {
        self.parts.push(part);
    }

    /// Move the leaf content (type, encoding, disposition, id, body) into a
    /// new part, leaving this part with an empty `text/plain` body.
    pub(crate) fn take_content(&mut self) -> MimePart {
        MimePart {
            headers: Headers::default(),
            content_type: std::mem::take(&mut self.content_type),
            transfer_encoding: self.transfer_encoding.take(),
            disposition: self.disposition.take(),
            content_id: self.content_id.take(),
            body: std::mem::take(&mut self.body),
            body_encoded: std::mem::take(&mut self.body_encoded),
            parts: std::mem::take(&mut self.parts),
        }
    }
}

/// Split a structured header value on `;`, respecting quoted strings.
fn split_params(raw: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in raw.chars() {
        match ch {
            _ if escaped => {
                current.push(ch);
                escaped = false;
            }
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

/// Parse `name=value` or `name="quoted value"`.
fn parse_param(segment: &str) -> Option<(String, String)> {
    let (name, value) = segment.split_once('=')?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    };
    Some((name, value))
}

/// Quote a parameter value if it contains RFC 2045 tspecials or spaces.
fn quote_param(value: &str) -> String {
    const TSPECIALS: &str = "()<>@,;:\\\"/[]?= \t";
    if !value.is_empty() && !value.chars().any(|c| TSPECIALS.contains(c) || c.is_control()) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::default();
        headers.append("X-Akonotes-UID", "1");
        assert_eq!(headers.get("x-akonotes-uid"), Some("1"));
        headers.set("X-AKONOTES-UID", "2");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Akonotes-UID"), Some("2"));
        assert!(headers.remove("x-akonotes-uid"));
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_set_drops_duplicates() {
        let mut headers = Headers::default();
        headers.append("Received", "a");
        headers.append("Received", "b");
        assert_eq!(headers.get_all("received").count(), 2);
        headers.set("Received", "c");
        assert_eq!(headers.get_all("received").collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("Text/HTML; charset=\"UTF-8\"; format=flowed");
        assert_eq!(ct.mime_type(), "Text/HTML");
        assert!(ct.is("text/html"));
        assert_eq!(ct.charset(), Some("UTF-8"));
        assert_eq!(ct.param("FORMAT"), Some("flowed"));
        assert!(ct.is_text());
        assert!(!ct.is_multipart());
    }

    #[test]
    fn test_content_type_quoted_semicolon() {
        let ct = ContentType::parse("multipart/mixed; boundary=\"a;b\"");
        assert!(ct.is_multipart());
        assert_eq!(ct.param("boundary"), Some("a;b"));
    }

    #[test]
    fn test_content_type_render() {
        let mut ct = ContentType::new("multipart/mixed");
        ct.set_param("boundary", "=_part_1");
        assert_eq!(ct.to_header_value(), "multipart/mixed; boundary=\"=_part_1\"");
        let mut text = ContentType::new("text/plain");
        text.set_charset("utf-8");
        assert_eq!(text.to_header_value(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_missing_content_type_defaults_to_text_plain() {
        assert_eq!(ContentType::default().mime_type(), "text/plain");
        assert_eq!(MimePart::new().content_type().header_text(), "text/plain");
    }

    #[test]
    fn test_parsed_content_type_keeps_header_text() {
        let empty = ContentType::parse("");
        assert_eq!(empty.mime_type(), "");
        assert_eq!(empty.header_text(), "");

        let mut latin = ContentType::parse("text/plain; charset=latin1");
        assert_eq!(latin.charset(), Some("latin1"));
        assert_eq!(latin.header_text(), "text/plain; charset=latin1");
        latin.remove_param("boundary");
        assert_eq!(latin.header_text(), "text/plain; charset=latin1");
        latin.set_charset("utf-8");
        assert_eq!(latin.header_text(), "text/plain; charset=utf-8");

        assert_eq!(ContentType::parse("Image/PNG").header_text(), "Image/PNG");
    }

    #[test]
    fn test_childless_multipart_is_a_leaf() {
        let mut part = MimePart::new();
        part.set_content_type(ContentType::new("multipart/mixed"));
        part.set_body(vec![1u8, 2, 3, 255]);
        assert!(part.content_type().is_multipart());
        assert!(!part.is_multipart());

        part.push_part(MimePart::new());
        assert!(part.is_multipart());
    }

    #[test]
    fn test_disposition_roundtrip() {
        let disposition = Disposition::attachment("attachment");
        let raw = disposition.to_header_value();
        assert_eq!(raw, "attachment; filename=attachment");
        assert_eq!(Disposition::parse(&raw), disposition);
        let inline = Disposition::parse("inline");
        assert_eq!(inline.kind, DispositionKind::Inline);
        assert!(inline.filename.is_none());
    }

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse(" BASE64 "), Some(TransferEncoding::Base64));
        assert_eq!(TransferEncoding::parse("x-uuencode"), None);
    }

    #[test]
    fn test_decoded_content_of_encoded_body() {
        let mut part = MimePart::new();
        part.set_transfer_encoding(TransferEncoding::Base64);
        part.set_encoded_body("aGVs\r\nbG8=");
        assert!(part.is_body_encoded());
        assert_eq!(part.decoded_content(), b"hello");
    }

    #[test]
    fn test_decoded_content_of_raw_body() {
        let mut part = MimePart::new();
        part.set_transfer_encoding(TransferEncoding::Base64);
        part.set_body("aGVsbG8=");
        assert_eq!(part.decoded_content(), b"aGVsbG8=");
    }

    #[test]
    fn test_decoded_text_uses_charset() {
        let mut part = MimePart::new();
        part.content_type_mut().set_charset("iso-8859-1");
        part.set_body(b"caf\xe9".to_vec());
        assert_eq!(part.decoded_text(), "café");
    }
}
