//! Clean command - removes build artifacts.

use anyhow::Result;
use std::path::Path;

use crate::clean;

/// Execute the clean command.
pub fn cmd_clean(root: &Path) -> Result<()> {
    println!("=== Clean ===");
    let removed = clean::clean(root)?;

    if removed.is_empty() {
        println!("Nothing to clean.");
    } else {
        for path in &removed {
            let shown = path.strip_prefix(root).unwrap_or(path);
            println!("  Removed {}", shown.display());
        }
        println!("Clean complete ({} removed).", removed.len());
    }
    Ok(())
}
