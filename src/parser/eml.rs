//! Reading notes stored as individual `.eml` files.

use std::path::Path;

use crate::error::{NoteError, Result};
use crate::model::note::Note;

/// Read a note from an `.eml` file.
///
/// Only I/O problems are errors. Content that does not parse as a message
/// yields an empty note, like [`Note::from_bytes`].
pub fn read_note(path: impl AsRef<Path>) -> Result<Note> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            NoteError::FileNotFound(path.to_path_buf())
        } else {
            NoteError::io(path, e)
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "Read note file");

    Ok(Note::from_bytes(&data))
}
