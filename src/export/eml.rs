//! Export notes as individual `.eml` files.

use std::path::{Path, PathBuf};

use crate::error::{NoteError, Result};
use crate::model::note::Note;
use crate::note::encode::NoteEncoder;
use crate::note::entropy::{Clock, UidSource};

/// Encode `note` and write it into `output_dir`.
///
/// The file is named `{date}_{title}.eml` after the encoded message, so
/// defaults filled in by the encoder show up in the name. An existing file
/// is never overwritten; a counter is appended instead.
///
/// Returns the path of the created file.
pub fn write_note<C: Clock, U: UidSource>(
    note: &Note,
    encoder: &NoteEncoder<C, U>,
    output_dir: &Path,
) -> Result<PathBuf> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(NoteError::InvalidPath(format!(
            "{} is not a directory",
            output_dir.display()
        )));
    }
    std::fs::create_dir_all(output_dir).map_err(|e| NoteError::io(output_dir, e))?;

    let msg = encoder.encode(note);
    let date = msg
        .date()
        .map(|d| d.format("%Y%m%d_%H%M%S").to_string())
        .unwrap_or_else(|| "undated".to_string());
    let title = sanitize_filename_part(msg.subject().unwrap_or_default(), 80);
    let path = unique_path(&output_dir.join(format!("{date}_{title}.eml")));

    std::fs::write(&path, msg.assemble()).map_err(|e| NoteError::io(&path, e))?;
    tracing::info!(path = %path.display(), "Note written");
    Ok(path)
}

/// Sanitize a string for use in filenames.
///
/// Replaces invalid characters with `_` and truncates to `max_len`.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "note".to_string()
    } else {
        sanitized
    }
}

/// First free path among `path`, `stem_1.ext`, `stem_2.ext`, ...
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("note");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("eml");
    let parent = path.parent().unwrap_or(Path::new("."));

    let mut i = 1u32;
    loop {
        let candidate = parent.join(format!("{stem}_{i}.{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::entropy::{FixedClock, FixedUid};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename_part("hello world", 20), "hello_world");
        assert_eq!(sanitize_filename_part("a/b\\c:d*e", 20), "a_b_c_d_e");
        assert_eq!(sanitize_filename_part("abcdef", 3), "abc");
        assert_eq!(sanitize_filename_part("", 20), "note");
    }

    #[test]
    fn test_write_note_rejects_file_as_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = write_note(&Note::new(), &NoteEncoder::new(), file.path()).unwrap_err();
        assert!(matches!(err, NoteError::InvalidPath(_)));
    }

    #[test]
    fn test_write_note_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = NoteEncoder::with_entropy(
            FixedClock(Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()),
            FixedUid("u".into()),
        );
        let mut note = Note::new();
        note.set_title("Plan: Q4");

        let first = write_note(&note, &encoder, dir.path()).unwrap();
        let second = write_note(&note, &encoder, dir.path()).unwrap();
        assert_eq!(
            first.file_name().and_then(|n| n.to_str()),
            Some("20261017_090000_Plan__Q4.eml")
        );
        assert_eq!(
            second.file_name().and_then(|n| n.to_str()),
            Some("20261017_090000_Plan__Q4_1.eml")
        );
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }
}
