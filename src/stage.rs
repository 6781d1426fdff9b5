//! Staging fresh artifacts into a developer's test directory.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common::copy_file;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::finalize::ArtifactDescriptor;
use crate::packager::BuildMode;
use crate::pipeline;

/// Directory holding the launcher's persisted state. Never touched here.
pub const STATE_DIR: &str = ".dm-sync";

/// Resolve a dev target to a canonical existing directory.
pub fn resolve_target(target: &Path) -> Result<PathBuf, BuildError> {
    if !target.exists() {
        return Err(BuildError::Input(format!(
            "Dev target does not exist: {}",
            target.display()
        )));
    }
    if !target.is_dir() {
        return Err(BuildError::Input(format!(
            "Dev target is not a directory: {}",
            target.display()
        )));
    }
    dunce::canonicalize(target).map_err(|e| {
        BuildError::Input(format!("Cannot resolve {}: {}", target.display(), e))
    })
}

/// Build the launcher and then the app, and copy both into `target`.
///
/// `target` must come from [`resolve_target`]. Returns the staged paths.
pub fn stage(ctx: &BuildContext, target: &Path) -> Result<Vec<PathBuf>> {
    let launcher = pipeline::build_artifact(ctx, BuildMode::Launcher)?;
    let app = pipeline::build_artifact(ctx, BuildMode::App)?;
    relocate(ctx, &[launcher, app], target)
}

/// Copy finished artifacts into `target`.
///
/// Existing files with the same names are overwritten; anything else in the
/// target, including the launcher's state directory, is left alone. The
/// copies in `dist/` stay where they are.
pub fn relocate(
    ctx: &BuildContext,
    artifacts: &[ArtifactDescriptor],
    target: &Path,
) -> Result<Vec<PathBuf>> {
    println!("=== Staging to {} ===", target.display());

    let mut staged = Vec::new();
    for artifact in artifacts {
        let dest = target.join(artifact.file_name());
        if same_file(&artifact.final_path, &dest) {
            println!("  [SKIP] {} already in place", artifact.file_name());
        } else {
            copy_file(&artifact.final_path, &dest)?;
            println!("  {}", artifact.file_name());
        }
        staged.push(dest);
    }

    if target.join(STATE_DIR).exists() {
        println!(
            "  Existing {} kept. Run {} --clean to start from fresh state.",
            STATE_DIR, ctx.strategy.launcher_file
        );
    }

    Ok(staged)
}

/// Copying a file onto itself truncates it.
fn same_file(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
