use crate::layout::{ContentId, archive_stem};
use crate::store::{PackageStore, extract_staged};

const TRACING_TARGET: &str = "cds_store::bootstrap";

impl PackageStore {
    /// Extract every archive in the root that has no extracted tree yet.
    ///
    /// Returns the ids that were extracted by this call, so a second call
    /// on an unchanged root returns nothing. Runs before the store serves
    /// requests and takes no per-id locks.
    pub fn initialize_packages(&self) -> Vec<ContentId> {
        let entries = match std::fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    root = %self.root().display(),
                    error = %e,
                    "failed to scan content directory"
                );
                return Vec::new();
            }
        };

        let mut imported = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(target: TRACING_TARGET, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let archive = entry.path();
            if !archive.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(archive_stem) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let id = match ContentId::parse(stem) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(target: TRACING_TARGET, error = %e, "skipping archive");
                    continue;
                }
            };

            let destination = self.layout().extracted_dir(&id);
            match std::fs::symlink_metadata(&destination) {
                Ok(metadata) if metadata.is_dir() => continue,
                Ok(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        id = %id,
                        path = %destination.display(),
                        "extraction target is occupied by a file, skipping archive"
                    );
                    continue;
                }
                Err(_) => {}
            }
            match extract_staged(&archive, &destination, &self.extract_options) {
                Ok(report) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        id = %id,
                        entries = report.entry_count,
                        "deployed new content package"
                    );
                    imported.push(id);
                }
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        id = %id,
                        error = %e,
                        "failed to extract content archive"
                    );
                }
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            count = imported.len(),
            "{} new content packages available",
            imported.len()
        );
        imported
    }
}
