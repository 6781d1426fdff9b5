//! Native archive helper bundled into the Windows app.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::process::Cmd;

pub const UNRAR_FILE: &str = "UnRAR.exe";

/// Locate the UnRAR helper, fetching it into the user cache when not vendored.
///
/// A previously fetched copy is reused.
pub fn ensure_unrar(ctx: &BuildContext) -> Result<PathBuf> {
    if ctx.paths.vendored_unrar.is_file() {
        log::debug!("Using vendored {}", ctx.paths.vendored_unrar.display());
        return Ok(ctx.paths.vendored_unrar.clone());
    }

    let cached = ctx.paths.cache_dir.join(UNRAR_FILE);
    if cached.is_file() && fs::metadata(&cached)?.len() > 0 {
        println!("  [SKIP] {} cached at {}", UNRAR_FILE, cached.display());
        return Ok(cached);
    }

    fs::create_dir_all(&ctx.paths.cache_dir)?;
    println!("  Fetching {} from {}", UNRAR_FILE, ctx.config.unrar_url);
    Cmd::new("curl")
        .args(["-fsSL", "-o"])
        .arg_path(&cached)
        .arg(&ctx.config.unrar_url)
        .error_msg(format!("Failed to download {}", UNRAR_FILE))
        .run_on(ctx.invoker)
        .map_err(|e| {
            BuildError::environment(
                format!("{:#}", e),
                format!(
                    "place {} at {} or set UNRAR_URL",
                    UNRAR_FILE,
                    ctx.paths.vendored_unrar.display()
                ),
            )
        })?;

    let fetched = fs::metadata(&cached).map(|m| m.len()).unwrap_or(0);
    if fetched == 0 {
        let _ = fs::remove_file(&cached);
        return Err(BuildError::environment(
            format!("Downloaded {} is empty", UNRAR_FILE),
            format!("check UNRAR_URL ({})", ctx.config.unrar_url),
        )
        .into());
    }

    Ok(cached)
}
