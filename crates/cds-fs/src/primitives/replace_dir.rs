use crate::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};

const TRACING_TARGET: &str = "cds_fs::replace_dir";

/// A unique hidden sibling of `path`, e.g. `.name.staging-<uuid>`.
///
/// Siblings live on the same filesystem as `path`, so renaming between
/// them never copies.
pub fn staging_path(path: impl AsRef<Path>, tag: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?;
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    Ok(parent.join(format!(
        ".{}.{}-{}",
        name,
        tag,
        uuid::Uuid::new_v4().simple()
    )))
}

/// Move `src` over `dest`, replacing any existing directory at `dest`.
///
/// The old tree is first renamed aside, so `dest` is only missing for the
/// instant between two renames. If the second rename fails the old tree is
/// moved back. Anything at `dest` other than a directory is left alone and
/// the call fails.
pub fn replace_dir(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    match std::fs::symlink_metadata(dest) {
        Err(_) => {
            return std::fs::rename(src, dest).map_err(|e| Error::ReplaceDir {
                path: dest.to_path_buf(),
                source: e,
            });
        }
        Ok(metadata) if !metadata.is_dir() => {
            return Err(Error::ReplaceDir {
                path: dest.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination exists and is not a directory",
                ),
            });
        }
        Ok(_) => {}
    }

    let displaced = staging_path(dest, "replaced")?;
    std::fs::rename(dest, &displaced).map_err(|e| Error::ReplaceDir {
        path: dest.to_path_buf(),
        source: e,
    })?;

    if let Err(e) = std::fs::rename(src, dest) {
        if let Err(restore) = std::fs::rename(&displaced, dest) {
            tracing::error!(
                target: TRACING_TARGET,
                path = %dest.display(),
                displaced = %displaced.display(),
                error = %restore,
                "failed to restore replaced directory"
            );
        }
        return Err(Error::ReplaceDir {
            path: dest.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = std::fs::remove_dir_all(&displaced) {
        tracing::warn!(
            target: TRACING_TARGET,
            path = %displaced.display(),
            error = %e,
            "failed to remove replaced directory"
        );
    }
    Ok(())
}
