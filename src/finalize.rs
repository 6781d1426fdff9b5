//! Post-processing of packaged outputs into deliverable artifacts.
//!
//! The launcher is delivered as packaged. The app bundle gets a `.version`
//! marker and is compressed so that the archive root holds the bundle's
//! contents (the launcher extracts it straight into its app directory).

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{copy_file, remove_path};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::packager::BuildMode;
use crate::platform::Compressor;
use crate::process::Cmd;

/// Marker read by the launcher to learn the installed app version.
pub const VERSION_MARKER: &str = ".version";

/// A finished artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub kind: BuildMode,
    /// What the packaging step produced.
    pub raw_path: PathBuf,
    /// What is delivered.
    pub final_path: PathBuf,
    pub size_bytes: u64,
    /// Hex SHA-256 of the final file.
    pub sha256: String,
}

impl ArtifactDescriptor {
    pub fn file_name(&self) -> String {
        self.final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn print_summary(&self) {
        println!("  {} ({})", self.final_path.display(), human_size(self.size_bytes));
        println!("    sha256: {}", self.sha256);
    }
}

fn human_size(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 1.0 {
        format!("{:.1} MB", mb)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

/// Turn packaged output into the deliverable for `mode`.
///
/// On delegated hosts the output arrives already finalized and is only
/// verified.
pub fn finalize(ctx: &BuildContext, mode: BuildMode, output: &Path) -> Result<ArtifactDescriptor> {
    println!("=== Finalizing {} ===", mode);

    if mode == BuildMode::Launcher || ctx.strategy.delegated {
        return describe(mode, output, output);
    }

    let raw = output;
    if !raw.is_dir() {
        return Err(finalize_error(
            mode,
            format!("app bundle directory missing at {}", raw.display()),
        ));
    }
    if !ctx.paths.version_file.is_file() {
        return Err(finalize_error(
            mode,
            format!("VERSION not found at {}", ctx.paths.version_file.display()),
        ));
    }

    copy_file(&ctx.paths.version_file, &raw.join(VERSION_MARKER))?;

    let archive = mode.final_artifact(ctx.strategy, &ctx.paths.dist_dir);
    remove_path(&archive)?;

    println!("  Compressing {} -> {}", raw.display(), archive.display());
    compress(ctx, raw, &archive).map_err(|e| finalize_error(mode, format!("{:#}", e)))?;

    remove_path(raw)?;

    describe(mode, raw, &archive)
}

fn compress(ctx: &BuildContext, raw: &Path, archive: &Path) -> Result<()> {
    let cmd = match ctx.strategy.compressor {
        Compressor::Zip => Cmd::new("zip")
            .args(["-r", "-q", "-y"])
            .arg_path(archive)
            .arg(".")
            .dir(raw),
        Compressor::CompressArchive => Cmd::new("powershell").args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            &format!(
                "Compress-Archive -Path '{}\\*' -DestinationPath '{}' -Force",
                ps_quote(raw),
                ps_quote(archive)
            ),
        ]),
    };
    cmd.error_msg("Compression failed").run_on(ctx.invoker)?;
    Ok(())
}

/// Escape a path for a single-quoted PowerShell string.
fn ps_quote(path: &Path) -> String {
    path.display().to_string().replace('\'', "''")
}

/// Verify that `final_path` is a non-empty file and describe it.
pub fn describe(mode: BuildMode, raw_path: &Path, final_path: &Path) -> Result<ArtifactDescriptor> {
    let meta = fs::metadata(final_path).map_err(|_| {
        finalize_error(mode, format!("artifact missing at {}", final_path.display()))
    })?;
    if !meta.is_file() {
        return Err(finalize_error(
            mode,
            format!("{} is not a file", final_path.display()),
        ));
    }
    if meta.len() == 0 {
        return Err(finalize_error(
            mode,
            format!("{} is empty", final_path.display()),
        ));
    }

    Ok(ArtifactDescriptor {
        kind: mode,
        raw_path: raw_path.to_path_buf(),
        final_path: final_path.to_path_buf(),
        size_bytes: meta.len(),
        sha256: sha256_file(final_path)?,
    })
}

/// Hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

fn finalize_error(mode: BuildMode, reason: String) -> anyhow::Error {
    BuildError::Finalize { mode, reason }.into()
}
