//! Content package lifecycle manager.
//!
//! A content package is a zip archive `{root}/{id}.zip` plus its extracted
//! tree `{root}/{id}/`. [`PackageStore`] owns the root directory and
//! provides every operation on packages:
//!
//! - upload: stream the archive to disk, extract into staging, swap in
//! - deletion: archive first, then the extracted tree
//! - retrieval: resolve archive and member paths for streaming
//! - bootstrap: extract archives that have no tree yet
//! - validation: descriptor and filename checks, reported, never enforced
//!
//! Mutating operations on the same id are serialized with a [`KeyedLock`].

mod bootstrap;
mod error;
mod layout;
mod lock;
mod store;
mod upload;
mod validate;

pub use error::{Error, IoResultExt, Result};
pub use layout::{ARCHIVE_EXTENSION, ContentId, DESCRIPTOR_FILE, Layout, MemberPath};
pub use lock::{KeyedGuard, KeyedLock};
pub use store::PackageStore;
pub use upload::UploadReceipt;
pub use validate::{PackageReport, ValidationIssue, ValidationReport, is_legal_file_name};

pub use cds_archive::{ArchiveReport, ExtractOptions};
