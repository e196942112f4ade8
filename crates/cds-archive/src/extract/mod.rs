//! Entry pipeline: sanitize each entry path, then recreate it on disk.

use std::io::{Read, Seek};
use std::path::Path;

use crate::entry::{ArchiveReport, Entry, EntryKind};
use crate::error::{Error, Result};
use crate::options::ExtractOptions;

mod zip;

pub use zip::{PendingEntry, ZipSource};

/// Unpack the zip archive at `source` into `target_dir`.
///
/// `target_dir` and its parents are created when missing. A failure part way
/// through leaves the entries written so far in place; use
/// [`crate::extract_to_workspace`] when that matters.
pub fn unzip(
    source: impl AsRef<Path>,
    target_dir: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let source = source.as_ref();
    let file = std::fs::File::open(source).map_err(|e| Error::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    extract_from_reader(std::io::BufReader::new(file), target_dir.as_ref(), options)
}

/// Unpack a zip archive read from `reader` into `destination`.
pub fn extract_from_reader<R: Read + Seek>(
    reader: R,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let mut source = ZipSource::new(reader)?;
    ensure_directory(destination)?;

    let mut entries = Vec::with_capacity(source.len());
    let mut total_bytes = 0u64;

    for index in 0..source.len() {
        let mut pending = source.entry(index)?;
        let sanitized = crate::sanitize_path(&pending.original_path, destination)?;

        let entry = Entry::new(pending.original_path.clone(), pending.size, pending.kind);

        match pending.kind {
            EntryKind::Directory => ensure_directory(&sanitized.resolved)?,
            EntryKind::File => {
                let budget = options.remaining(total_bytes);
                total_bytes += write_file(&mut pending.reader, &sanitized.resolved, budget, options)?;
            }
        }

        entries.push(entry);
    }

    Ok(ArchiveReport {
        entry_count: entries.len(),
        total_bytes,
        entries,
    })
}

fn write_file<R: Read>(
    reader: &mut R,
    target_path: &Path,
    budget: Option<u64>,
    options: &ExtractOptions,
) -> Result<u64> {
    if let Some(parent) = target_path.parent() {
        ensure_directory(parent)?;
    }

    let mut file = std::fs::File::create(target_path).map_err(|e| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;

    let written = match budget {
        None => std::io::copy(reader, &mut file),
        // one byte over the budget is enough to detect the overflow
        Some(budget) => std::io::copy(&mut reader.take(budget.saturating_add(1)), &mut file),
    }
    .map_err(|e| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;

    if let (Some(budget), Some(limit)) = (budget, options.max_total_bytes) {
        if written > budget {
            return Err(Error::TooLarge { limit });
        }
    }

    Ok(written)
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn extract_from_reader_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let result = extract_from_reader(Cursor::new(data), dir.path(), &ExtractOptions::default());
        assert!(matches!(result, Err(Error::Corrupted(_))));
    }

    #[test]
    fn unzip_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = unzip(dir.path().join("missing.zip"), dir.path().join("out"), &ExtractOptions::default());
        assert!(matches!(result, Err(Error::Open { .. })));
        assert!(!dir.path().join("out").exists());
    }
}
