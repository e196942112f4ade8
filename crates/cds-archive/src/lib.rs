//! Zip extraction with path sanitization and transactional staging.
//!
//! # Architecture
//!
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract/` - Entry pipeline and the zip entry source
//! - `workspace.rs` - Extraction into a staging tree, committed by swap
//! - `entry.rs` - Entry and report types

pub use entry::{ArchiveReport, Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::{extract_from_reader, unzip};
pub use options::ExtractOptions;
pub use sanitize::{SanitizedPath, sanitize_path};
pub use workspace::{WorkspaceExtraction, extract_to_workspace};

pub mod entry;
mod error;
pub mod extract;
pub mod options;
mod sanitize;
mod workspace;
