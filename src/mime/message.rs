//! Top-level message: a root [`MimePart`] plus typed access to the
//! RFC 5322 fields the note mapping needs.

use chrono::{DateTime, Utc};

use super::part::{ContentType, MimePart};
use crate::error::Result;
use crate::parser::header::parse_date;

/// An RFC 5322 message held in memory.
///
/// A fresh message is a single `text/plain` part. Adding a child part with
/// [`MimeMessage::add_part`] turns it into `multipart/mixed`, and the former
/// body becomes the first child (the main body part).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeMessage {
    root: MimePart,
}

impl MimeMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing root part.
    pub fn from_root(root: MimePart) -> Self {
        Self { root }
    }

    /// Parse raw RFC 5322 bytes.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        crate::parser::mime::parse_message(raw)
    }

    pub fn root(&self) -> &MimePart {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut MimePart {
        &mut self.root
    }

    /// Top-level header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.root.header(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.root.headers_mut().set(name, value);
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.set_header("Subject", subject);
    }

    pub fn from(&self) -> Option<&str> {
        self.header("From")
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.set_header("From", from);
    }

    /// The `Date` header, if present and parseable.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.header("Date").and_then(parse_date)
    }

    /// Set the `Date` header (RFC 2822, second precision).
    pub fn set_date(&mut self, date: DateTime<Utc>) {
        self.set_header("Date", date.to_rfc2822());
    }

    /// The part carrying the message text: the first leaf reached by
    /// following first children from the root.
    pub fn main_body_part(&self) -> &MimePart {
        let mut part = &self.root;
        while part.is_multipart() {
            match part.parts().first() {
                Some(first) => part = first,
                None => break,
            }
        }
        part
    }

    pub fn main_body_part_mut(&mut self) -> &mut MimePart {
        let mut part = &mut self.root;
        while part.is_multipart() && !part.parts().is_empty() {
            part = &mut part.parts_mut()[0];
        }
        part
    }

    /// Immediate children of the root (empty for single-part messages).
    pub fn contents(&self) -> &[MimePart] {
        self.root.parts()
    }

    /// Append a child part, converting the message to `multipart/mixed`
    /// first if it is still single-part.
    pub fn add_part(&mut self, part: MimePart) {
        if !self.root.is_multipart() {
            let body = self.root.take_content();
            self.root
                .set_content_type(ContentType::new("multipart/mixed"));
            self.root.push_part(body);
        }
        self.root.push_part(part);
    }
}
