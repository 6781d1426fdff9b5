//! Filesystem helpers: idempotent removal, copies and tree mirroring.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Directory names never mirrored into a remote build.
pub const MIRROR_EXCLUDES: &[&str] = &[
    ".git",
    ".venv",
    "build",
    "dist",
    "target",
    "__pycache__",
    ".dm-sync",
];

/// Remove a file or directory tree if present.
///
/// Returns whether anything was removed. A missing path is not an error.
pub fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("Failed to stat {}", path.display())),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Copy a regular file, creating destination parents as needed.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.is_file() {
        bail!("{} is not a file", from.display());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))
}

/// Copy the tree at `from` into `to`, skipping directories named in `excludes`.
///
/// Returns the number of files copied.
pub fn mirror_dir(from: &Path, to: &Path, excludes: &[&str]) -> Result<usize> {
    if !from.is_dir() {
        bail!("{} is not a directory", from.display());
    }
    fs::create_dir_all(to)?;

    let mut copied = 0;
    let walker = WalkDir::new(from).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !(e.file_type().is_dir()
                && excludes.iter().any(|x| e.file_name() == std::ffi::OsStr::new(x)))
    }) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(from)?;
        let dest = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest).with_context(|| {
                format!("Failed to mirror {} to {}", entry.path().display(), dest.display())
            })?;
            copied += 1;
        } else {
            log::debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    Ok(copied)
}
