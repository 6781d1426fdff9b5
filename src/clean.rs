//! Build artifact cleaning.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::common::remove_path;

/// Directories never descended into.
const PROTECTED: &[&str] = &[".venv", ".git", "target"];

/// Remove every build by-product under `root`.
///
/// Returns what was removed. Missing entries are skipped, so a second run
/// removes nothing.
pub fn clean(root: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for dir in ["build", "dist"] {
        let path = root.join(dir);
        if remove_path(&path)? {
            removed.push(path);
        }
    }

    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "spec") {
            if remove_path(&path)? {
                removed.push(path);
            }
        }
    }

    let mut caches = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        e.depth() == 0
            || !(e.file_type().is_dir()
                && PROTECTED.iter().any(|p| e.file_name() == std::ffi::OsStr::new(p)))
    });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry during clean: {}", e);
                continue;
            }
        };
        let is_cache_dir = entry.file_type().is_dir() && entry.file_name() == "__pycache__";
        let is_pyc = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|e| e == "pyc");
        if is_cache_dir || is_pyc {
            caches.push(entry.into_path());
        }
    }

    // Children of a removed __pycache__ are already gone.
    for path in caches {
        if remove_path(&path)? {
            removed.push(path);
        }
    }

    Ok(removed)
}
