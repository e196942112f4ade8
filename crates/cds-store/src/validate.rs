use std::fmt;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::layout::ContentId;
use crate::store::PackageStore;

const TRACING_TARGET: &str = "cds_store::validate";

static LEGAL_FILE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").unwrap());

/// Whether a single path component is a legal member file name.
pub fn is_legal_file_name(name: &str) -> bool {
    LEGAL_FILE_NAME.is_match(name)
}

/// A single finding of the package validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    DescriptorMissing { path: PathBuf },
    DescriptorUnreadable { path: PathBuf, reason: String },
    DescriptorMalformed { path: PathBuf, reason: String },
    IllegalFileName { path: PathBuf, component: String },
    Unreadable { path: PathBuf, reason: String },
}

impl ValidationIssue {
    pub fn is_descriptor_issue(&self) -> bool {
        matches!(
            self,
            Self::DescriptorMissing { .. }
                | Self::DescriptorUnreadable { .. }
                | Self::DescriptorMalformed { .. }
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DescriptorMissing { path } => {
                write!(f, "descriptor {} does not exist", path.display())
            }
            Self::DescriptorUnreadable { path, reason } => {
                write!(f, "descriptor {} cannot be read: {reason}", path.display())
            }
            Self::DescriptorMalformed { path, reason } => {
                write!(f, "descriptor {} is not a JSON object: {reason}", path.display())
            }
            Self::IllegalFileName { path, component } => write!(
                f,
                "illegal file name '{component}' in {}",
                path.display()
            ),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read {}: {reason}", path.display())
            }
        }
    }
}

/// Validation result for one package.
#[derive(Clone, Debug, Serialize)]
pub struct PackageReport {
    pub id: ContentId,
    pub issues: Vec<ValidationIssue>,
}

impl PackageReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn descriptor_ok(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_descriptor_issue)
    }

    pub fn content_ok(&self) -> bool {
        self.issues.iter().all(ValidationIssue::is_descriptor_issue)
    }
}

/// Validation result for every listed package.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub packages: Vec<PackageReport>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.packages.iter().all(PackageReport::is_valid)
    }

    pub fn valid(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages.iter().filter(|p| p.is_valid())
    }

    pub fn invalid(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages.iter().filter(|p| !p.is_valid())
    }

    pub fn get(&self, id: &ContentId) -> Option<&PackageReport> {
        self.packages.iter().find(|p| &p.id == id)
    }
}

impl PackageStore {
    /// True when `content.json` exists, is readable and holds a JSON object.
    pub fn check_descriptor(&self, id: &ContentId) -> bool {
        self.descriptor_issue(id).is_none()
    }

    /// True when every file in the package has a legal name on every
    /// component of its relative path.
    pub fn check_package_content(&self, id: &ContentId) -> bool {
        self.content_issue(id).is_none()
    }

    /// Run both checks for one package.
    pub fn validate_package(&self, id: &ContentId) -> PackageReport {
        let issues = self
            .descriptor_issue(id)
            .into_iter()
            .chain(self.content_issue(id))
            .collect();
        PackageReport {
            id: id.clone(),
            issues,
        }
    }

    /// Validate every listed package. Findings are logged and reported;
    /// nothing is removed.
    pub fn check_content_packages(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for id in self.list_packages() {
            let package = self.validate_package(&id);
            if package.is_valid() {
                tracing::debug!(target: TRACING_TARGET, id = %id, "content package is valid");
            } else {
                tracing::warn!(
                    target: TRACING_TARGET,
                    id = %id,
                    issues = package.issues.len(),
                    "content package failed validation"
                );
            }
            report.packages.push(package);
        }
        report
    }

    fn descriptor_issue(&self, id: &ContentId) -> Option<ValidationIssue> {
        let path = self.layout().descriptor_path(id);
        let issue = match cds_fs::atomic_read(&path) {
            Ok(bytes) => match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&bytes) {
                Ok(_) => return None,
                Err(e) => ValidationIssue::DescriptorMalformed {
                    path,
                    reason: e.to_string(),
                },
            },
            Err(e) if e.is_not_found() => ValidationIssue::DescriptorMissing { path },
            Err(e) => ValidationIssue::DescriptorUnreadable {
                path,
                reason: e.to_string(),
            },
        };
        tracing::warn!(target: TRACING_TARGET, id = %id, "{issue}");
        Some(issue)
    }

    fn content_issue(&self, id: &ContentId) -> Option<ValidationIssue> {
        let root = self.layout().extracted_dir(id);
        let issue = first_content_issue(&root)?;
        tracing::warn!(target: TRACING_TARGET, id = %id, "{issue}");
        Some(issue)
    }
}

fn first_content_issue(root: &Path) -> Option<ValidationIssue> {
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root);
                return Some(ValidationIssue::Unreadable {
                    path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        for component in relative.components() {
            let Component::Normal(part) = component else {
                continue;
            };
            let name = part.to_string_lossy();
            if !is_legal_file_name(&name) {
                return Some(ValidationIssue::IllegalFileName {
                    path: relative.to_path_buf(),
                    component: name.into_owned(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_file_names() {
        for name in ["index.html", "logo_2.PNG", "a", "..", "v1.0.0"] {
            assert!(is_legal_file_name(name), "{name}");
        }
        for name in ["", "my file.txt", "dash-ed", "ümlaut", "a/b", "semi;colon"] {
            assert!(!is_legal_file_name(name), "{name}");
        }
    }

    #[test]
    fn content_walk_reports_relative_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("ok/bad dir")).unwrap();
        std::fs::write(root.join("ok/fine.txt"), "x").unwrap();
        std::fs::write(root.join("ok/bad dir/file.txt"), "x").unwrap();

        let issue = first_content_issue(root).unwrap();
        assert_eq!(
            issue,
            ValidationIssue::IllegalFileName {
                path: PathBuf::from("ok/bad dir/file.txt"),
                component: "bad dir".into(),
            }
        );
    }

    #[test]
    fn directories_alone_are_not_checked() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("empty dir")).unwrap();
        assert!(first_content_issue(temp_dir.path()).is_none());
    }

    #[test]
    fn missing_tree_is_unreadable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let issue = first_content_issue(&temp_dir.path().join("missing")).unwrap();
        assert!(matches!(issue, ValidationIssue::Unreadable { .. }));
    }

    #[test]
    fn report_partitions() {
        let ok = PackageReport {
            id: ContentId::parse("ok").unwrap(),
            issues: vec![],
        };
        let bad = PackageReport {
            id: ContentId::parse("bad").unwrap(),
            issues: vec![ValidationIssue::DescriptorMissing {
                path: PathBuf::from("bad/content.json"),
            }],
        };
        assert!(!bad.descriptor_ok());
        assert!(bad.content_ok());

        let report = ValidationReport {
            packages: vec![ok, bad],
        };
        assert!(!report.is_clean());
        assert_eq!(report.valid().count(), 1);
        assert_eq!(report.invalid().next().unwrap().id.as_str(), "bad");
        assert!(report.get(&ContentId::parse("ok").unwrap()).is_some());
    }
}
