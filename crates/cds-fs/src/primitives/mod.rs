pub mod atomic_write;
pub mod remove;
pub mod replace_dir;

pub use atomic_write::{AtomicWriteOptions, atomic_read, atomic_write};
pub use remove::{remove_dir_all_if_exists, remove_file_if_exists};
pub use replace_dir::{replace_dir, staging_path};
