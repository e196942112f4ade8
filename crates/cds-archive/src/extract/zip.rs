use std::io::{Read, Seek};
use std::path::PathBuf;

use crate::entry::EntryKind;
use crate::error::{Error, Result};

/// An entry read from the archive but not yet written.
pub struct PendingEntry<R> {
    pub original_path: PathBuf,
    pub size: u64,
    pub kind: EntryKind,
    pub reader: R,
}

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Open entry `index`. The returned reader borrows the archive, so it
    /// must be consumed before the next entry is opened.
    pub fn entry(&mut self, index: usize) -> Result<PendingEntry<impl Read + '_>> {
        let file = self.archive.by_index(index)?;

        // enclosed_name refuses absolute paths and `..` traversal
        let original_path = match file.enclosed_name() {
            Some(p) => p,
            None => {
                let raw = PathBuf::from(file.name());
                return Err(Error::ZipSlip {
                    entry: raw.clone(),
                    resolved: raw,
                });
            }
        };

        let kind = if file.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Ok(PendingEntry {
            original_path,
            size: file.size(),
            kind,
            reader: file,
        })
    }
}
