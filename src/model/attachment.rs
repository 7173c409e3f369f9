//! Note attachments.
//!
//! An attachment is either a reference to external content (a URL) or an
//! inline payload carried inside the note message itself.

use serde::{Deserialize, Serialize};

/// Where the attachment content lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentOrigin {
    /// External content referenced by URL. The string is kept verbatim.
    Reference(String),
    /// Inline payload. Raw bytes unless the attachment is marked pre-encoded.
    Inline(Vec<u8>),
}

/// A single attachment of a note.
///
/// Two attachments are equal when origin, pre-encoded flag, MIME type,
/// content id and label all match.
///
/// # Examples
/// ```
/// use notemime::model::attachment::Attachment;
///
/// let logo = Attachment::from_data(b"\x89PNG".to_vec(), "image/png").with_label("logo");
/// assert_eq!(logo.label(), "logo");
/// assert!(logo.url().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    origin: AttachmentOrigin,
    mimetype: String,
    label: String,
    content_id: String,
    pre_encoded: bool,
}

impl Attachment {
    /// Create an attachment that only references `url`.
    ///
    /// Neither the URL nor the MIME type is validated.
    pub fn from_url(url: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self::new(AttachmentOrigin::Reference(url.into()), mimetype.into())
    }

    /// Create an attachment whose content is stored inline.
    pub fn from_data(data: impl Into<Vec<u8>>, mimetype: impl Into<String>) -> Self {
        Self::new(AttachmentOrigin::Inline(data.into()), mimetype.into())
    }

    fn new(origin: AttachmentOrigin, mimetype: String) -> Self {
        Self {
            origin,
            mimetype,
            label: String::new(),
            content_id: String::new(),
            pre_encoded: false,
        }
    }

    pub fn origin(&self) -> &AttachmentOrigin {
        &self.origin
    }

    /// The referenced URL, for reference attachments.
    pub fn url(&self) -> Option<&str> {
        match &self.origin {
            AttachmentOrigin::Reference(url) => Some(url),
            AttachmentOrigin::Inline(_) => None,
        }
    }

    /// The referenced URL parsed as an absolute URL.
    ///
    /// Returns `None` for inline attachments and for references that do
    /// not parse (relative paths, garbage). The raw string is still
    /// available through [`Attachment::url`].
    pub fn parsed_url(&self) -> Option<url::Url> {
        let raw = self.url()?;
        match url::Url::parse(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(url = raw, error = %e, "Attachment reference is not an absolute URL");
                None
            }
        }
    }

    /// The inline payload, for inline attachments.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.origin {
            AttachmentOrigin::Inline(data) => Some(data),
            AttachmentOrigin::Reference(_) => None,
        }
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Label presented to the user (empty if none).
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    /// Identifier the note text can use to refer to this attachment
    /// (empty if none).
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn set_content_id(&mut self, content_id: impl Into<String>) {
        self.content_id = content_id.into();
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.set_content_id(content_id);
        self
    }

    /// `true` if the inline data is already base64 text.
    pub fn is_pre_encoded(&self) -> bool {
        self.pre_encoded
    }

    /// Mark the inline data as already base64-encoded (or not).
    pub fn set_pre_encoded(&mut self, encoded: bool) {
        self.pre_encoded = encoded;
    }

    pub fn with_pre_encoded(mut self, encoded: bool) -> Self {
        self.set_pre_encoded(encoded);
        self
    }
}
