use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// File extension of package archives under the root.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Name of the optional descriptor inside an extracted package.
pub const DESCRIPTOR_FILE: &str = "content.json";

/// Identifier of a content package.
///
/// Ids are opaque and case-sensitive. An id must be usable as a single
/// path component, so separators, NUL and a leading `.` are rejected.
/// Dot-prefixed names under the root belong to staging entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let illegal = raw.is_empty()
            || raw.starts_with('.')
            || raw.contains(['/', '\\', '\0']);
        if illegal {
            return Err(Error::InvalidId(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Relative path of a member file inside an extracted package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberPath(PathBuf);

impl MemberPath {
    /// Normalize a request path, rejecting anything that could leave the
    /// package directory.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut normalized = PathBuf::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::InvalidPath(raw.to_string()));
                }
            }
        }
        if normalized.as_os_str().is_empty() || raw.contains('\0') {
            return Err(Error::InvalidPath(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Filesystem layout of the package root.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_path(&self, id: &ContentId) -> PathBuf {
        self.root
            .join(format!("{}.{ARCHIVE_EXTENSION}", id.as_str()))
    }

    pub fn extracted_dir(&self, id: &ContentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn member_path(&self, id: &ContentId, member: &MemberPath) -> PathBuf {
        self.extracted_dir(id).join(member.as_path())
    }

    pub fn descriptor_path(&self, id: &ContentId) -> PathBuf {
        self.extracted_dir(id).join(DESCRIPTOR_FILE)
    }
}

/// Strip the archive extension from a file name in the root.
pub(crate) fn archive_stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(ARCHIVE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}
