use std::path::Path;

use cds_fs::Workspace;

use crate::entry::ArchiveReport;
use crate::error::Result;
use crate::extract::unzip;
use crate::options::ExtractOptions;

/// An extraction staged next to its destination, waiting to be swapped in.
pub struct WorkspaceExtraction {
    workspace: Workspace,
    report: ArchiveReport,
}

impl WorkspaceExtraction {
    /// Swap the staged tree over the destination.
    pub fn commit(self) -> Result<ArchiveReport> {
        self.workspace.commit()?;
        Ok(self.report)
    }

    pub fn abort(self) {
        drop(self.workspace);
    }

    pub fn report(&self) -> &ArchiveReport {
        &self.report
    }
}

/// Unzip `source` into a fresh staging directory beside `destination`.
///
/// Nothing at `destination` changes until [`WorkspaceExtraction::commit`];
/// on error the staging tree is removed.
pub fn extract_to_workspace(
    source: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<WorkspaceExtraction> {
    let workspace = Workspace::for_destination(destination)?;
    let report = unzip(source, workspace.path(), options)?;
    Ok(WorkspaceExtraction { workspace, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_extraction_report_access() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(temp_dir.path().join("staging"), temp_dir.path().join("dest")).unwrap();
        let extraction = WorkspaceExtraction {
            workspace,
            report: ArchiveReport::default(),
        };
        assert_eq!(extraction.report().entry_count, 0);
    }

    #[test]
    fn workspace_extraction_abort_drops_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let staging_path = temp_dir.path().join("staging");
        let workspace = Workspace::new(&staging_path, temp_dir.path().join("dest")).unwrap();
        let extraction = WorkspaceExtraction {
            workspace,
            report: ArchiveReport::default(),
        };
        assert!(staging_path.exists());
        extraction.abort();
        assert!(!staging_path.exists());
    }

    #[test]
    fn extract_to_workspace_invalid_format_keeps_destination() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("bad.zip");
        std::fs::write(&source, [0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let dest = temp_dir.path().join("dest");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("keep.txt"), "keep").unwrap();

        let result = extract_to_workspace(&source, &dest, &ExtractOptions::default());
        assert!(result.is_err());
        assert!(dest.join("keep.txt").exists());

        // staging tree is gone, only the source and destination remain
        let count = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }
}
