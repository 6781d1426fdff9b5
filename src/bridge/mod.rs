//! Delegation of Windows builds from a WSL host.
//!
//! A WSL host cannot produce Windows executables itself. Instead it:
//!
//! 1. Opens a session directory in the Windows temp dir (uniquely named)
//! 2. Mirrors the project sources into it
//! 3. Runs the bundled `remote-build.ps1` through `powershell.exe`
//! 4. Copies the finished artifact back into the local `dist/`
//!
//! The session directory is owned by [`BridgeSession`] and removed when it is
//! dropped, whichever way the delegation ends.

pub mod wsl;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::common::{copy_file, mirror_dir, remove_path, MIRROR_EXCLUDES};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::packager::{self, helper, BuildMode, BuildRequest};
use crate::process::Cmd;

const REMOTE_SCRIPT: &str = include_str!("../../scripts/remote-build.ps1");
const REMOTE_SCRIPT_NAME: &str = "remote-build.ps1";

/// A temporary build directory on the Windows side.
#[derive(Debug)]
pub struct BridgeSession {
    name: String,
    local_dir: PathBuf,
    windows_dir: String,
}

impl BridgeSession {
    /// Create a fresh session directory under the Windows temp dir.
    pub fn open(ctx: &BuildContext) -> Result<Self> {
        wsl::require_interop(ctx.invoker)?;
        let temp = wsl::windows_temp_dir(ctx.invoker)?;
        let name = format!("{}-build-{}", ctx.config.product, Uuid::new_v4());
        let windows_dir = wsl::join(&temp, &name);
        let local_dir = wsl::to_linux(ctx.invoker, &windows_dir)?;

        fs::create_dir_all(&local_dir).map_err(|e| {
            BuildError::Bridge(format!(
                "could not create session dir {}: {}",
                local_dir.display(),
                e
            ))
        })?;
        log::debug!("bridge session {} at {}", name, local_dir.display());

        Ok(Self {
            name,
            local_dir,
            windows_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn windows_dir(&self) -> &str {
        &self.windows_dir
    }

    fn source_local(&self) -> PathBuf {
        self.local_dir.join("src")
    }

    fn source_windows(&self) -> String {
        wsl::join(&self.windows_dir, "src")
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        match remove_path(&self.local_dir) {
            Ok(_) => log::debug!("bridge session {} removed", self.name),
            Err(e) => log::warn!(
                "Failed to clean up bridge session {}: {:#}",
                self.local_dir.display(),
                e
            ),
        }
    }
}

/// Run `request` on the Windows side and bring the artifact home.
///
/// Returns the local path of the copied artifact. The app arrives already
/// compressed; the launcher arrives as its executable.
pub fn delegate(ctx: &BuildContext, request: &BuildRequest) -> Result<PathBuf> {
    let mode = request.mode;
    println!("=== Delegating {} build to Windows ===", mode);

    packager::pre_clean(ctx, mode)?;

    let entry = request.source_dir.join(&request.entry_point);
    if !entry.is_file() {
        return Err(BuildError::Packaging {
            mode,
            entry_point: request.entry_point.clone(),
            detail: format!("entry point not found at {}", entry.display()),
        }
        .into());
    }

    let session = BridgeSession::open(ctx)?;
    println!("  Session: {}", session.windows_dir());

    let copied = mirror_dir(&request.source_dir, &session.source_local(), MIRROR_EXCLUDES)?;
    println!("  Mirrored {} files", copied);

    if mode == BuildMode::App && ctx.strategy.bundles_unrar {
        let staged = session.source_local().join("libs/bin").join(helper::UNRAR_FILE);
        if !staged.is_file() {
            let unrar = helper::ensure_unrar(ctx)?;
            copy_file(&unrar, &staged)?;
        }
    }

    let script = session.local_dir().join(REMOTE_SCRIPT_NAME);
    fs::write(&script, REMOTE_SCRIPT)?;

    let result = Cmd::new(wsl::POWERSHELL)
        .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"])
        .arg(wsl::join(session.windows_dir(), REMOTE_SCRIPT_NAME))
        .args(["-Mode", mode.as_str()])
        .args(["-BuildDir", session.windows_dir()])
        .args(["-SourceDir", &session.source_windows()])
        .args(["-Python", &ctx.config.remote_python])
        .args(["-Product", &ctx.config.product])
        .streaming()
        .allow_fail()
        .run_on(ctx.invoker)
        .map_err(|e| BuildError::Bridge(format!("{:#}", e)))?;

    if !result.success() {
        return Err(BuildError::Bridge(format!(
            "remote {} build exited with code {}",
            mode, result.code
        ))
        .into());
    }

    let final_path = mode.final_artifact(ctx.strategy, &ctx.paths.dist_dir);
    let file_name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    let remote = session.local_dir().join("dist").join(&file_name);
    if !remote.is_file() {
        return Err(BuildError::Bridge(format!(
            "remote build produced no {}",
            file_name.to_string_lossy()
        ))
        .into());
    }

    copy_file(&remote, &final_path).map_err(|e| {
        BuildError::Bridge(format!("copying the artifact back failed: {:#}", e))
    })?;
    println!("  Copied back {}", final_path.display());

    Ok(final_path)
}
