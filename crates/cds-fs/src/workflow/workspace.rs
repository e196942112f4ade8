use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A staging directory that replaces `destination` on commit.
///
/// Dropping an uncommitted workspace removes the staging tree.
pub struct Workspace {
    staging_path: PathBuf,
    destination_path: PathBuf,
    committed: bool,
}

impl Workspace {
    pub fn new(staging_dir: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let staging_path = staging_dir.as_ref().to_path_buf();
        let destination_path = destination.as_ref().to_path_buf();

        if !staging_path.exists() {
            std::fs::create_dir_all(&staging_path).map_err(|e| Error::Write {
                path: staging_path.clone(),
                source: e,
            })?;
        }

        Ok(Self {
            staging_path,
            destination_path,
            committed: false,
        })
    }

    /// Stage next to `destination`, in a fresh hidden sibling directory.
    pub fn for_destination(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref();
        let staging = crate::primitives::staging_path(destination, "staging")?;
        Self::new(staging, destination)
    }

    pub fn path(&self) -> &Path {
        &self.staging_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    pub fn commit(mut self) -> Result<()> {
        crate::primitives::replace_dir(&self.staging_path, &self.destination_path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.staging_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    target: "cds_fs::workspace",
                    path = %self.staging_path.display(),
                    error = %e,
                    "failed to remove staging directory"
                );
            }
        }
    }
}
