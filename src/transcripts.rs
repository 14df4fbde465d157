//! Transcript source: a directory of text files, one transcript per file.
//!
//! Files are listed with a recognized extension and sorted by filename so
//! batch runs are deterministic. An unreadable file becomes a per-file error
//! entry rather than aborting the listing.

use std::fs;
use std::path::Path;

use crate::error::{JudgrError, Result};

/// One transcript slot: the file name plus its content or read error.
#[derive(Debug)]
pub struct TranscriptEntry {
    pub name: String,
    pub text: Result<String>,
}

impl TranscriptEntry {
    /// Build an entry holding transcript text.
    pub fn ok(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Ok(text.into()),
        }
    }

    /// Build an entry holding a read failure.
    pub fn failed(name: impl Into<String>, error: JudgrError) -> Self {
        Self {
            name: name.into(),
            text: Err(error),
        }
    }
}

/// Load all transcripts with the given extension from a directory, sorted by
/// filename.
pub fn load_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<TranscriptEntry>> {
    let dir = dir.as_ref();
    let read_dir = fs::read_dir(dir).map_err(|e| {
        JudgrError::TranscriptRead(format!("cannot list {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        {
            paths.push(path);
        }
    }

    // Directory-listing order is not guaranteed; sort for determinism
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match fs::read_to_string(&path) {
            Ok(text) => entries.push(TranscriptEntry::ok(name, text)),
            Err(e) => {
                log::warn!("Skipping unreadable transcript {}: {}", path.display(), e);
                entries.push(TranscriptEntry::failed(
                    name.clone(),
                    JudgrError::TranscriptRead(format!("{}: {}", name, e)),
                ));
            }
        }
    }

    Ok(entries)
}
