use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cds_archive::{ArchiveReport, ExtractOptions};

use crate::error::{Error, IoResultExt, Result};
use crate::layout::{ContentId, Layout, MemberPath};
use crate::lock::KeyedLock;

const TRACING_TARGET: &str = "cds_store::store";

/// Owner of the package root and every operation on it.
#[derive(Debug)]
pub struct PackageStore {
    layout: Layout,
    pub(crate) locks: KeyedLock,
    pub(crate) extract_options: ExtractOptions,
}

impl PackageStore {
    /// Open a store over an existing root directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::RootUnavailable(root));
        }
        tracing::debug!(target: TRACING_TARGET, root = %root.display(), "opened content store");
        Ok(Self {
            layout: Layout::new(root),
            locks: KeyedLock::new(),
            extract_options: ExtractOptions::default(),
        })
    }

    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Ids of all extracted packages, in filesystem order.
    ///
    /// Staging entries and directories whose names are not valid ids are
    /// skipped. A listing failure is logged and yields an empty list.
    pub fn list_packages(&self) -> Vec<ContentId> {
        let entries = match std::fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    root = %self.root().display(),
                    error = %e,
                    "failed to list content packages"
                );
                return Vec::new();
            }
        };

        let mut packages = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(target: TRACING_TARGET, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match ContentId::parse(name) {
                Ok(id) => packages.push(id),
                Err(e) => tracing::debug!(target: TRACING_TARGET, error = %e, "skipping directory"),
            }
        }
        packages
    }

    /// Path of the stored archive for `id`.
    pub async fn archive_file(&self, id: &ContentId) -> Result<PathBuf> {
        let path = self.layout.archive_path(id);
        match existing_file(&path).await? {
            true => Ok(path),
            false => Err(Error::package_not_found(id)),
        }
    }

    /// Path of a member file inside the extracted package.
    pub async fn member_file(&self, id: &ContentId, member: &MemberPath) -> Result<PathBuf> {
        let path = self.layout.member_path(id, member);
        match existing_file(&path).await? {
            true => Ok(path),
            false => Err(Error::NotFound(format!("{member} in content package {id}"))),
        }
    }

    /// Remove the archive, then the extracted tree.
    ///
    /// A missing archive fails with [`Error::NotFound`] and leaves any
    /// directory alone.
    pub async fn delete_package(&self, id: &ContentId) -> Result<()> {
        let _guard = self.locks.lock(id).await;

        let archive = self.layout.archive_path(id);
        let directory = self.layout.extracted_dir(id);
        let owned = id.clone();
        tokio::task::spawn_blocking(move || remove_package(&owned, &archive, &directory)).await??;

        tracing::info!(target: TRACING_TARGET, id = %id, "deleted content package");
        Ok(())
    }
}

fn remove_package(id: &ContentId, archive: &Path, directory: &Path) -> Result<()> {
    let removed = cds_fs::remove_file_if_exists(archive).map_err(|source| Error::Deletion {
        id: id.clone(),
        source,
    })?;
    if !removed {
        return Err(Error::package_not_found(id));
    }
    cds_fs::remove_dir_all_if_exists(directory).map_err(|source| Error::Deletion {
        id: id.clone(),
        source,
    })?;
    Ok(())
}

async fn existing_file(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(e).with_path(path),
    }
}

/// Extract `archive` beside `destination` and swap it into place.
pub(crate) fn extract_staged(
    archive: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> cds_archive::Result<ArchiveReport> {
    cds_archive::extract_to_workspace(archive, destination, options)?.commit()
}
