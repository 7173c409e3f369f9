//! The note record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;

/// Access-sensitivity label of a note. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[default]
    Public,
    Private,
    Confidential,
}

impl Classification {
    /// The literal written to the classification header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
            Self::Confidential => "Confidential",
        }
    }

    /// Map a header value to a classification.
    ///
    /// Only the exact literals `Private` and `Confidential` are recognized;
    /// anything else (including an empty value) is `Public`.
    pub fn from_header(value: &str) -> Self {
        match value {
            "Private" => Self::Private,
            "Confidential" => Self::Confidential,
            _ => Self::Public,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parser for user input (config files, command line).
impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "confidential" => Ok(Self::Confidential),
            other => Err(format!(
                "unknown classification '{other}' (expected public, private or confidential)"
            )),
        }
    }
}

/// Format of the note body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    /// HTML.
    Rich,
}

impl TextFormat {
    /// MIME type of the main body part for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Rich => "text/html",
        }
    }
}

/// A note: title, body, author, timestamps, classification, attachments and
/// free-form key/value metadata.
///
/// Build an empty note with [`Note::new`] and fill it through the setters,
/// or read one from a message with [`Note::from_message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    uid: String,
    title: String,
    text: String,
    text_format: TextFormat,
    from: String,
    creation_date: Option<DateTime<Utc>>,
    last_modified_date: Option<DateTime<Utc>>,
    classification: Classification,
    attachments: Vec<Attachment>,
    custom: BTreeMap<String, String>,
}

impl Note {
    /// An empty note. Every field is empty or unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Globally unique identifier (empty until set or decoded).
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.uid = uid.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_format(&self) -> TextFormat {
        self.text_format
    }

    /// Set the body together with its format.
    pub fn set_text(&mut self, text: impl Into<String>, format: TextFormat) {
        self.text = text.into();
        self.text_format = format;
    }

    /// `true` if the body is empty or whitespace only.
    pub fn has_blank_text(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Author of the note, usually the creating application.
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = from.into();
    }

    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    pub fn set_creation_date(&mut self, date: DateTime<Utc>) {
        self.creation_date = Some(date);
    }

    /// Unset the creation date; encoding then fills in the current time.
    pub fn clear_creation_date(&mut self) {
        self.creation_date = None;
    }

    pub fn last_modified_date(&self) -> Option<DateTime<Utc>> {
        self.last_modified_date
    }

    pub fn set_last_modified_date(&mut self, date: DateTime<Utc>) {
        self.last_modified_date = Some(date);
    }

    pub fn clear_last_modified_date(&mut self) {
        self.last_modified_date = None;
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn set_classification(&mut self, classification: Classification) {
        self.classification = classification;
    }

    /// Attachments in insertion order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Mutable access for adding, removing or reordering attachments.
    pub fn attachments_mut(&mut self) -> &mut Vec<Attachment> {
        &mut self.attachments
    }

    /// Custom key/value metadata.
    pub fn custom(&self) -> &BTreeMap<String, String> {
        &self.custom
    }

    pub fn custom_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_note_is_empty() {
        let note = Note::new();
        assert_eq!(note.uid(), "");
        assert_eq!(note.title(), "");
        assert_eq!(note.text_format(), TextFormat::Plain);
        assert_eq!(note.classification(), Classification::Public);
        assert!(note.creation_date().is_none());
        assert!(note.last_modified_date().is_none());
        assert!(note.attachments().is_empty());
        assert!(note.custom().is_empty());
    }

    #[test]
    fn test_classification_from_header() {
        assert_eq!(Classification::from_header("Private"), Classification::Private);
        assert_eq!(
            Classification::from_header("Confidential"),
            Classification::Confidential
        );
        assert_eq!(Classification::from_header("Public"), Classification::Public);
        assert_eq!(Classification::from_header("private"), Classification::Public);
        assert_eq!(Classification::from_header("TopSecret"), Classification::Public);
        assert_eq!(Classification::from_header(""), Classification::Public);
    }

    #[test]
    fn test_classification_from_str_is_lenient() {
        assert_eq!("PRIVATE".parse::<Classification>(), Ok(Classification::Private));
        assert_eq!(
            " confidential ".parse::<Classification>(),
            Ok(Classification::Confidential)
        );
        assert!("secret".parse::<Classification>().is_err());
    }

    #[test]
    fn test_blank_text() {
        let mut note = Note::new();
        assert!(note.has_blank_text());
        note.set_text(" \n\t", TextFormat::Plain);
        assert!(note.has_blank_text());
        note.set_text("x", TextFormat::Rich);
        assert!(!note.has_blank_text());
        assert_eq!(note.text_format(), TextFormat::Rich);
    }

    #[test]
    fn test_collections_are_editable_in_place() {
        let mut note = Note::new();
        note.attachments_mut()
            .push(Attachment::from_url("https://example.com", "text/html"));
        note.custom_mut().insert("color".into(), "yellow".into());
        assert_eq!(note.attachments().len(), 1);
        assert_eq!(note.custom().get("color").map(String::as_str), Some("yellow"));
    }

    #[test]
    fn test_dates_can_be_cleared() {
        let date = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let mut note = Note::new();
        note.set_creation_date(date);
        note.set_last_modified_date(date);
        note.clear_creation_date();
        assert_eq!(note.creation_date(), None);
        assert_eq!(note.last_modified_date(), Some(date));
        note.clear_last_modified_date();
        assert_eq!(note, Note::new());
    }
}
