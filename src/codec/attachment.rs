//! `attachment` parts: one part per note attachment.
//!
//! A reference attachment carries its URL in `X-Akonotes-Url` and an empty
//! body; an inline attachment carries its payload as the body. Both declare
//! base64 transfer encoding and an `attachment` disposition.

use tracing::debug;

use super::{tagged_part, PartKind, LABEL_HEADER, URL_HEADER};
use crate::mime::{ContentType, Disposition, MimePart, TransferEncoding};
use crate::model::attachment::{Attachment, AttachmentOrigin};

/// Filename written in every attachment part's disposition.
pub const FILENAME_PLACEHOLDER: &str = "attachment";

/// Build the part for `attachment`.
///
/// Pre-encoded inline data is stored as an already-encoded body so the
/// assembler writes it verbatim instead of encoding it a second time.
pub fn encode_attachment_part(attachment: &Attachment) -> MimePart {
    let mut part = tagged_part(PartKind::Attachment);

    match attachment.origin() {
        AttachmentOrigin::Reference(url) => part.headers_mut().set(URL_HEADER, url.as_str()),
        AttachmentOrigin::Inline(data) if attachment.is_pre_encoded() => {
            part.set_encoded_body(data.clone())
        }
        AttachmentOrigin::Inline(data) => part.set_body(data.clone()),
    }

    part.set_content_type(ContentType::new(attachment.mimetype()));
    if !attachment.label().is_empty() {
        part.headers_mut().set(LABEL_HEADER, attachment.label());
    }
    part.set_transfer_encoding(TransferEncoding::Base64);
    part.set_disposition(Disposition::attachment(FILENAME_PLACEHOLDER));
    if !attachment.content_id().is_empty() {
        part.set_content_id(attachment.content_id());
    }

    part
}

/// Rebuild an attachment from its part.
///
/// The mimetype is the Content-Type text as written. The URL header wins
/// over any body. Missing label or content id read as empty strings; the
/// result is never marked pre-encoded.
pub fn decode_attachment_part(part: &MimePart) -> Attachment {
    let mimetype = part.content_type().header_text().into_owned();

    let mut attachment = match part.header(URL_HEADER) {
        Some(url) => {
            if !part.body().is_empty() {
                debug!(url, "Reference attachment has a body, ignoring it");
            }
            Attachment::from_url(url, mimetype)
        }
        None => Attachment::from_data(part.decoded_content(), mimetype),
    };
    attachment.set_label(part.header(LABEL_HEADER).unwrap_or_default());
    attachment.set_content_id(part.content_id().unwrap_or_default());
    attachment
}
