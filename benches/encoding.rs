use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use notemime::note::entropy::{FixedClock, FixedUid};
use notemime::{Attachment, Note, NoteEncoder, TextFormat};

fn sample_note() -> Note {
    let mut note = Note::new();
    note.set_title("Benchmark note");
    note.set_text("line of text\n".repeat(200), TextFormat::Plain);
    note.attachments_mut()
        .push(Attachment::from_url("https://example.com/doc", "text/html"));
    note.attachments_mut()
        .push(Attachment::from_data(vec![0xA5; 64 * 1024], "application/octet-stream"));
    for i in 0..20 {
        note.custom_mut().insert(format!("key{i}"), format!("value {i}"));
    }
    note
}

fn bench_encode(c: &mut Criterion) {
    let encoder = NoteEncoder::with_entropy(
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        FixedUid("bench".into()),
    );
    let note = sample_note();

    c.bench_function("encode_note_to_bytes", |b| {
        b.iter(|| encoder.encode_to_bytes(&note))
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = NoteEncoder::new().encode_to_bytes(&sample_note());

    c.bench_function("decode_note_from_bytes", |b| {
        b.iter(|| Note::from_bytes(&bytes))
    });
}

fn bench_decode_fixture(c: &mut Criterion) {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("unknown_part.eml");

    c.bench_function("read_note_fixture", |b| {
        b.iter(|| notemime::parser::eml::read_note(&fixture_path).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_fixture);
criterion_main!(benches);
