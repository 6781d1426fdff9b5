//! Dependency provisioning.
//!
//! Makes sure an interpreter with the packaging tool and the app's pinned
//! runtime dependencies exists before anything is packaged:
//!
//! - native hosts: a project-local venv (`.venv/`)
//! - WSL hosts: the Windows interpreter, reached through interop
//!
//! Reinstallation is skipped when the packaging tool is importable. This is
//! an importability check, not a version check, so a bumped pin is not picked
//! up until the environment is recreated.

pub mod interpreter;
mod remote;
mod venv;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::context::BuildContext;
use crate::platform::HostClass;

pub use interpreter::{InterpreterInfo, PACKAGER_MODULE};
pub use venv::{activation_env, venv_python};

/// Ensure the build environment for the context's host.
pub fn ensure(ctx: &BuildContext) -> Result<()> {
    println!("=== Dependencies ===");
    match ctx.host {
        HostClass::LinuxBridge => remote::ensure_remote(ctx),
        _ => venv::ensure_local(ctx),
    }
}

/// Read requirement pins from a requirements file.
///
/// Comments, blank lines and pip option lines are dropped. A missing file
/// means no pins.
pub fn requirement_pins(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        log::debug!("No requirements file at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut pins = Vec::new();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('-') {
            log::warn!("Ignoring pip option line in {}: {}", path.display(), line);
            continue;
        }
        pins.push(line.to_string());
    }
    Ok(pins)
}
