//! Filesystem primitives used by the content store.
//!
//! Everything here works on plain paths and never looks at package
//! semantics:
//!
//! - `primitives/` - atomic writes, directory swaps, tolerant removal
//! - `workflow/` - staging workspaces committed by rename

mod error;
pub mod primitives;
pub mod workflow;

pub use error::{Error, Result};
pub use primitives::{
    AtomicWriteOptions, atomic_read, atomic_write, remove_dir_all_if_exists,
    remove_file_if_exists, replace_dir, staging_path,
};
pub use workflow::Workspace;
