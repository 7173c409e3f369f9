//! Note sub-part codec.
//!
//! Every part a note message carries besides its text is tagged with the
//! `X-Akonotes-Type` header. The tag selects the codec: `custom` parts hold
//! the metadata map as a small XML document, `attachment` parts hold one
//! attachment each.

pub mod attachment;
pub mod custom;

use crate::mime::MimePart;

/// Discriminator header on every note sub-part.
pub const TYPE_HEADER: &str = "X-Akonotes-Type";
/// Discriminator value of the metadata part.
pub const TYPE_CUSTOM: &str = "custom";
/// Discriminator value of attachment parts.
pub const TYPE_ATTACHMENT: &str = "attachment";

/// Header holding the URL of a reference attachment.
pub const URL_HEADER: &str = "X-Akonotes-Url";
/// Header holding the user-visible attachment label.
pub const LABEL_HEADER: &str = "X-Akonotes-Label";

/// Charset declared on every text part we write.
pub const CHARSET: &str = "utf-8";

/// What a tagged sub-part contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    CustomMetadata,
    Attachment,
    /// A tag this version does not understand.
    Unknown(String),
}

impl PartKind {
    /// Read the discriminator of `part`. Returns `None` for untagged parts
    /// (such as the main text part).
    pub fn of(part: &MimePart) -> Option<Self> {
        let tag = part.header(TYPE_HEADER)?;
        Some(match tag {
            TYPE_CUSTOM => Self::CustomMetadata,
            TYPE_ATTACHMENT => Self::Attachment,
            other => Self::Unknown(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CustomMetadata => TYPE_CUSTOM,
            Self::Attachment => TYPE_ATTACHMENT,
            Self::Unknown(tag) => tag,
        }
    }
}

/// A new part carrying the discriminator for `kind`.
fn tagged_part(kind: PartKind) -> MimePart {
    let mut part = MimePart::new();
    part.headers_mut().set(TYPE_HEADER, kind.as_str());
    part
}
