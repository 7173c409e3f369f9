//! Best-effort plain-text rendering of a note body.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::note::{Note, TextFormat};

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("body pattern is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

impl Note {
    /// The note text with markup removed.
    ///
    /// Plain notes are returned unchanged. For rich notes the `<body>`
    /// content (or the whole text when there is no body element) is
    /// stripped of tags, trimmed and escaped for display. Lossy.
    ///
    /// ```
    /// use notemime::model::note::{Note, TextFormat};
    ///
    /// let mut note = Note::new();
    /// note.set_text("<html><body>Hello <b>World</b></body></html>", TextFormat::Rich);
    /// assert_eq!(note.to_plain_text(), "Hello World");
    /// ```
    pub fn to_plain_text(&self) -> Cow<'_, str> {
        match self.text_format() {
            TextFormat::Plain => Cow::Borrowed(self.text()),
            TextFormat::Rich => Cow::Owned(strip_markup(self.text())),
        }
    }
}

fn strip_markup(html: &str) -> String {
    let inner = BODY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(html, |m| m.as_str());
    escape(TAG_RE.replace_all(inner, "").trim())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
