use crate::primitives::staging_path;
use crate::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct AtomicWriteOptions {
    pub permissions: Option<u32>,
    pub sync: bool,
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Write `content` to a hidden sibling of `path`, then rename it into place.
///
/// Readers see either the previous file or the complete new one.
pub fn atomic_write(
    path: impl AsRef<Path>,
    content: &[u8],
    options: AtomicWriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = staging_path(path, "tmp")?;

    let write = |tmp: &Path| -> io::Result<()> {
        let mut file = fs::File::create(tmp)?;
        file.write_all(content)?;
        if options.sync {
            file.sync_all()?;
        }
        Ok(())
    };

    discard_on_error(&tmp_path, &tmp_path, write(&tmp_path))?;
    discard_on_error(&tmp_path, &tmp_path, apply_permissions(&tmp_path, options.permissions))?;
    discard_on_error(&tmp_path, path, fs::rename(&tmp_path, path))
}

#[cfg(unix)]
fn apply_permissions(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

/// Remove the temp file when `result` failed, reporting the error at `path`.
fn discard_on_error<T>(tmp_path: &Path, path: &Path, result: io::Result<T>) -> Result<T> {
    result.map_err(|e| {
        let _ = fs::remove_file(tmp_path);
        Error::Write {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

pub fn atomic_read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })
}
