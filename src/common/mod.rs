//! Shared utilities across synchotic-build modules.

pub mod fs;

pub use fs::{copy_file, mirror_dir, remove_path, MIRROR_EXCLUDES};
