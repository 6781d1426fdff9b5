//! Dev command - builds both artifacts and stages them for manual testing.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::context::BuildContext;
use crate::deps;
use crate::platform::HostClass;
use crate::process::Invoker;
use crate::stage;

/// Execute the dev command.
///
/// `target` must already be resolved with [`stage::resolve_target`], so a bad
/// target is rejected before the host is even probed.
pub fn cmd_dev(
    config: &Config,
    host: HostClass,
    invoker: &dyn Invoker,
    target: &Path,
) -> Result<Vec<PathBuf>> {
    let ctx = BuildContext::new(config, host, invoker)?;
    println!("Dev build on {} -> {}", host, target.display());

    deps::ensure(&ctx)?;
    let staged = stage::stage(&ctx, target)?;

    println!();
    println!("=== Dev Build Complete ===");
    for path in &staged {
        println!("  {}", path.display());
    }
    Ok(staged)
}
