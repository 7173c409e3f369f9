//! End-to-end tests: notes through assembled bytes and back.

use std::path::PathBuf;

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};

use notemime::codec::{PartKind, TYPE_HEADER};
use notemime::export::eml::write_note;
use notemime::note::entropy::{FixedClock, FixedUid};
use notemime::parser::eml::read_note;
use notemime::{Attachment, Classification, MimeMessage, Note, NoteEncoder, TextFormat};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

fn encoder() -> NoteEncoder<FixedClock, FixedUid> {
    NoteEncoder::with_entropy(
        FixedClock(instant()),
        FixedUid("00000000-0000-4000-8000-000000000000".into()),
    )
}

fn full_note() -> Note {
    let mut note = Note::new();
    note.set_uid("5e0f8c34-7d2a-4b8e-91c3-6a5d4f2e1b09");
    note.set_title("Weekend — plans");
    note.set_text("Saturday: hike\nSunday: museum, café", TextFormat::Plain);
    note.set_from("Jordan <jordan@example.org>");
    note.set_creation_date(Utc.with_ymd_and_hms(2026, 10, 9, 20, 15, 42).unwrap());
    note.set_last_modified_date(Utc.with_ymd_and_hms(2026, 10, 16, 6, 1, 0).unwrap());
    note.set_classification(Classification::Confidential);
    note.attachments_mut().push(
        Attachment::from_url("https://example.org/trails?id=7&map=1", "text/html")
            .with_label("Trail map"),
    );
    note.attachments_mut().push(
        Attachment::from_data(vec![0u8, 159, 146, 150, 255, 10, 13], "application/octet-stream")
            .with_content_id("blob@notes"),
    );
    note.attachments_mut()
        .push(Attachment::from_data(b"tickets: 2\n".to_vec(), "text/plain").with_label("Tickets"));
    note.custom_mut().insert("color".into(), "green".into());
    note.custom_mut().insert("due date".into(), "2026-10-24".into());
    note.custom_mut().insert("expr".into(), "a < b & c".into());
    note
}

#[test]
fn test_roundtrip_in_memory() {
    let note = full_note();
    let decoded = Note::from_message(&encoder().encode(&note));
    assert_eq!(decoded, note);
}

#[test]
fn test_roundtrip_through_bytes() {
    let note = full_note();
    let bytes = encoder().encode_to_bytes(&note);
    let decoded = Note::from_bytes(&bytes);
    assert_eq!(decoded, note);
}

#[test]
fn test_rich_roundtrip_through_bytes() {
    let mut note = full_note();
    note.set_text("<html><body><p>Hello</p></body></html>", TextFormat::Rich);
    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    assert_eq!(decoded.text_format(), TextFormat::Rich);
    assert_eq!(decoded.text(), note.text());
}

#[test]
fn test_assembly_is_deterministic() {
    let note = full_note();
    assert_eq!(encoder().encode_to_bytes(&note), encoder().encode_to_bytes(&note));
}

#[test]
fn test_defaults_survive_decoding() {
    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&Note::new()));
    assert_eq!(decoded.title(), "New Note");
    assert_eq!(decoded.uid(), "00000000-0000-4000-8000-000000000000");
    assert_eq!(decoded.creation_date(), Some(instant()));
    assert_eq!(decoded.last_modified_date(), Some(instant()));
    assert_eq!(decoded.classification(), Classification::Public);
    // The placeholder body is whitespace and trims away
    assert_eq!(decoded.text(), "");
}

#[test]
fn test_system_entropy_fills_defaults() {
    let decoded = Note::from_bytes(&Note::new().message().assemble());
    assert!(!decoded.uid().is_empty());
    assert!(decoded.creation_date().is_some());
    assert!(decoded.last_modified_date().is_some());
}

#[test]
fn test_reference_attachment_has_no_data() {
    let mut note = Note::new();
    note.attachments_mut()
        .push(Attachment::from_url("file:///home/jordan/plan.odt", "application/vnd.oasis.opendocument.text"));
    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    let att = &decoded.attachments()[0];
    assert_eq!(att.url(), Some("file:///home/jordan/plan.odt"));
    assert!(att.data().is_none());
    assert_eq!(att.mimetype(), "application/vnd.oasis.opendocument.text");
}

#[test]
fn test_pre_encoded_attachment_is_not_encoded_twice() {
    let payload = b"raw attachment payload".to_vec();
    let encoded = base64::engine::general_purpose::STANDARD.encode(&payload);

    let mut note = Note::new();
    note.attachments_mut().push(
        Attachment::from_data(encoded.clone().into_bytes(), "application/octet-stream")
            .with_pre_encoded(true),
    );
    let bytes = encoder().encode_to_bytes(&note);
    let wire = String::from_utf8_lossy(&bytes);
    assert!(wire.contains(&encoded));
    let double = base64::engine::general_purpose::STANDARD.encode(encoded.as_bytes());
    assert!(!wire.contains(&double));

    let decoded = Note::from_bytes(&bytes);
    let att = &decoded.attachments()[0];
    assert_eq!(att.data(), Some(payload.as_slice()));
    assert!(!att.is_pre_encoded());
}

#[test]
fn test_text_attachments_keep_non_utf8_bytes() {
    let bytes = vec![b'c', b'a', b'f', 0xE9, b'\n', 0xFF];
    let mut note = Note::new();
    note.attachments_mut()
        .push(Attachment::from_data(bytes.clone(), "text/plain"));
    note.attachments_mut()
        .push(Attachment::from_data(bytes.clone(), "text/html"));

    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    assert_eq!(decoded.attachments().len(), 2);
    for att in decoded.attachments() {
        assert_eq!(att.data(), Some(bytes.as_slice()));
    }
    assert_eq!(decoded.attachments(), note.attachments());
}

#[test]
fn test_surrounding_whitespace_survives_bytes() {
    let mut note = Note::new();
    note.set_title("  padded title ");
    note.set_uid(" u1 ");
    note.set_from(" me ");
    note.attachments_mut()
        .push(Attachment::from_url(" https://x ", "text/html").with_label(" lbl "));

    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    assert_eq!(decoded.title(), "  padded title ");
    assert_eq!(decoded.uid(), " u1 ");
    assert_eq!(decoded.from(), " me ");
    let att = &decoded.attachments()[0];
    assert_eq!(att.url(), Some(" https://x "));
    assert_eq!(att.label(), " lbl ");
}

#[test]
fn test_attachment_mimetypes_survive_bytes() {
    let mut note = Note::new();
    for mimetype in ["Image/PNG", "", "text/plain; charset=latin1", "multipart/mixed"] {
        note.attachments_mut()
            .push(Attachment::from_data(vec![1u8, 2, 3, 255], mimetype));
    }

    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    assert_eq!(decoded.attachments(), note.attachments());
    assert_eq!(decoded.attachments()[3].data(), Some(&[1u8, 2, 3, 255][..]));
}

#[test]
fn test_cleared_dates_are_refilled() {
    let mut note = full_note();
    note.clear_creation_date();
    note.clear_last_modified_date();
    let decoded = Note::from_bytes(&encoder().encode_to_bytes(&note));
    assert_eq!(decoded.creation_date(), Some(instant()));
    assert_eq!(decoded.last_modified_date(), Some(instant()));
}

#[test]
fn test_empty_metadata_has_no_part() {
    let mut note = full_note();
    note.custom_mut().clear();
    let msg = MimeMessage::parse(&encoder().encode_to_bytes(&note)).unwrap();
    assert!(msg
        .contents()
        .iter()
        .all(|p| PartKind::of(p) != Some(PartKind::CustomMetadata)));
    assert_eq!(
        msg.contents()
            .iter()
            .filter(|p| p.header(TYPE_HEADER).is_some())
            .count(),
        3
    );
}

#[test]
fn test_unknown_part_is_skipped() {
    let note = read_note(fixture("unknown_part.eml")).unwrap();
    assert_eq!(note.title(), "Trip ideas");
    assert_eq!(note.from(), "Notes <notes@example.com>");
    assert_eq!(note.text(), "Lisbon in spring\nPorto after that");
    assert_eq!(note.uid(), "9f0c2b7e-5a41-4d2e-9c1e-2f6a0b8d7e31");
    assert_eq!(note.classification(), Classification::Private);
    assert_eq!(
        note.creation_date(),
        Some(Utc.with_ymd_and_hms(2026, 10, 15, 16, 4, 11).unwrap())
    );
    assert_eq!(
        note.last_modified_date(),
        Some(Utc.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap())
    );

    assert_eq!(note.attachments().len(), 1);
    let guide = &note.attachments()[0];
    assert_eq!(guide.url(), Some("https://example.com/lisbon"));
    assert_eq!(guide.label(), "Guide");

    assert_eq!(note.custom().get("color").map(String::as_str), Some("teal"));
    assert_eq!(note.custom().get("trip year").map(String::as_str), Some("2027"));
}

#[test]
fn test_malformed_metadata_is_dropped() {
    let note = read_note(fixture("malformed_custom.eml")).unwrap();
    assert_eq!(note.title(), "Broken metadata");
    assert_eq!(note.text(), "still readable");
    assert!(note.custom().is_empty());

    let blob = &note.attachments()[0];
    assert_eq!(blob.data(), Some(&[0u8, 1, 2, 255][..]));
    assert_eq!(blob.content_id(), "blob-1");
    assert_eq!(blob.label(), "");
}

#[test]
fn test_unrecognized_classification_and_bad_date() {
    let note = read_note(fixture("odd_classification.eml")).unwrap();
    assert_eq!(note.title(), "Café list");
    assert_eq!(note.classification(), Classification::Public);
    assert_eq!(note.last_modified_date(), None);
    assert_eq!(
        note.creation_date(),
        Some(Utc.with_ymd_and_hms(2026, 10, 12, 10, 0, 0).unwrap())
    );
    assert_eq!(note.text_format(), TextFormat::Rich);
    assert_eq!(note.to_plain_text(), "Espresso &amp;amp; croissant");
}

#[test]
fn test_plain_text_of_rich_note() {
    let mut note = Note::new();
    note.set_text("<html><body>Hello <b>World</b></body></html>", TextFormat::Rich);
    assert_eq!(note.to_plain_text(), "Hello World");
}

#[test]
fn test_garbage_file_reads_as_note() {
    let dir = assert_fs::TempDir::new().unwrap();
    let path = dir.path().join("junk.eml");
    std::fs::write(&path, b"\x00\x01 definitely not a message").unwrap();
    let note = read_note(&path).unwrap();
    assert!(note.attachments().is_empty());
    assert!(note.custom().is_empty());
}

#[test]
fn test_write_then_read() {
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    let dir = assert_fs::TempDir::new().unwrap();
    let note = full_note();
    let path = write_note(&note, &encoder(), dir.path()).unwrap();

    let written = dir.child(path.file_name().unwrap());
    written.assert(predicate::path::exists());
    written.assert(predicate::str::contains("X-Akonotes-Classification: Confidential"));
    written.assert(predicate::str::contains("X-Akonotes-Type: custom"));

    assert_eq!(read_note(&path).unwrap(), note);
}
