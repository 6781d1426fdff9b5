//! Packaging of Python entry points into self-contained executables.
//!
//! The launcher is a single-file executable; the app is a directory bundle
//! that the finalizer later compresses. Every run starts from a clean slate:
//! the scratch directory, the mode's raw output and its final artifact are
//! removed first, so repeated builds of the same inputs end in the same state.

pub mod helper;

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::remove_path;
use crate::context::BuildContext;
use crate::deps;
use crate::error::BuildError;
use crate::platform::{HostClass, PlatformStrategy};
use crate::process::Cmd;

/// Which artifact is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    App,
    Launcher,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Launcher => "launcher",
        }
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            Self::App => "sync.py",
            Self::Launcher => "launcher.py",
        }
    }

    /// Name handed to the packaging tool.
    pub fn output_name(self, strategy: &PlatformStrategy) -> &'static str {
        match self {
            Self::App => strategy.app_name,
            Self::Launcher => strategy.launcher_name,
        }
    }

    /// What the packaging tool leaves in `dist/`.
    pub fn raw_output(self, strategy: &PlatformStrategy, dist: &Path) -> PathBuf {
        match self {
            Self::App => dist.join(strategy.app_name),
            Self::Launcher => dist.join(strategy.launcher_file),
        }
    }

    /// What the user receives after finalizing.
    pub fn final_artifact(self, strategy: &PlatformStrategy, dist: &Path) -> PathBuf {
        match self {
            Self::App => dist.join(strategy.app_archive),
            Self::Launcher => dist.join(strategy.launcher_file),
        }
    }

    fn onefile(self) -> bool {
        matches!(self, Self::Launcher)
    }
}

/// One packaging job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub mode: BuildMode,
    pub source_dir: PathBuf,
    pub entry_point: String,
    pub output_name: String,
}

impl BuildRequest {
    /// Standard request for `mode` against the project root.
    pub fn new(ctx: &BuildContext, mode: BuildMode) -> Self {
        Self {
            mode,
            source_dir: ctx.paths.root.clone(),
            entry_point: mode.entry_point().to_string(),
            output_name: mode.output_name(ctx.strategy).to_string(),
        }
    }
}

/// Remove the scratch directory and everything this mode previously produced.
pub fn pre_clean(ctx: &BuildContext, mode: BuildMode) -> Result<()> {
    let dist = &ctx.paths.dist_dir;
    for path in [
        ctx.paths.build_dir.clone(),
        mode.raw_output(ctx.strategy, dist),
        mode.final_artifact(ctx.strategy, dist),
    ] {
        if remove_path(&path)? {
            log::debug!("pre-clean removed {}", path.display());
        }
    }
    Ok(())
}

/// Package `request` with the local environment. Returns the raw output path.
pub fn package(ctx: &BuildContext, request: &BuildRequest) -> Result<PathBuf> {
    let mode = request.mode;
    println!("=== Packaging {} ===", mode);

    pre_clean(ctx, mode)?;

    let entry = request.source_dir.join(&request.entry_point);
    if !entry.is_file() {
        return Err(BuildError::Packaging {
            mode,
            entry_point: request.entry_point.clone(),
            detail: format!("entry point not found at {}", entry.display()),
        }
        .into());
    }

    let cmd = packager_command(ctx, request, &entry)?;
    let cmd = deps::activation_env(ctx)
        .iter()
        .fold(cmd, |cmd, (k, v)| cmd.env(k, v));

    let result = cmd
        .streaming()
        .allow_fail()
        .run_on(ctx.invoker)
        .map_err(|e| BuildError::Packaging {
            mode,
            entry_point: request.entry_point.clone(),
            detail: format!("{:#}", e),
        })?;

    if !result.success() {
        return Err(BuildError::Packaging {
            mode,
            entry_point: request.entry_point.clone(),
            detail: format!("PyInstaller exited with code {}", result.code),
        }
        .into());
    }

    let raw = ctx.paths.dist_dir.join(raw_file_name(ctx, request));
    if !raw.exists() {
        return Err(BuildError::Packaging {
            mode,
            entry_point: request.entry_point.clone(),
            detail: format!("expected output missing at {}", raw.display()),
        }
        .into());
    }

    if let Err(e) = remove_path(&ctx.paths.build_dir) {
        log::warn!("Could not remove scratch dir: {:#}", e);
    }

    println!("  Packaged {}", raw.display());
    Ok(raw)
}

/// File the packaging tool writes for `request`.
fn raw_file_name(ctx: &BuildContext, request: &BuildRequest) -> String {
    let on_windows = ctx.strategy.launcher_file.ends_with(".exe");
    if request.mode.onefile() && on_windows && !request.output_name.ends_with(".exe") {
        format!("{}.exe", request.output_name)
    } else {
        request.output_name.clone()
    }
}

fn packager_command(ctx: &BuildContext, request: &BuildRequest, entry: &Path) -> Result<Cmd> {
    let python = deps::venv_python(ctx);
    let sep = ctx.strategy.data_separator;

    let mut cmd = Cmd::new(python.to_string_lossy())
        .args(["-m", deps::PACKAGER_MODULE, "--noconfirm", "--clean"])
        .arg("--distpath")
        .arg_path(&ctx.paths.dist_dir)
        .arg("--workpath")
        .arg_path(&ctx.paths.build_dir)
        .arg("--specpath")
        .arg_path(&ctx.paths.build_dir)
        .args(["--name", &request.output_name])
        .arg(if request.mode.onefile() {
            "--onefile"
        } else {
            "--onedir"
        })
        .dir(&request.source_dir);

    if request.mode == BuildMode::App {
        for data in [
            ctx.paths.version_file.clone(),
            request.source_dir.join("drives.json"),
        ] {
            if data.is_file() {
                cmd = cmd
                    .arg("--add-data")
                    .arg(format!("{}{}.", data.display(), sep));
            }
        }

        if ctx.strategy.bundles_unrar {
            let unrar = helper::ensure_unrar(ctx)?;
            cmd = cmd
                .arg("--add-binary")
                .arg(format!("{}{}.", unrar.display(), sep));
        }
    }

    if ctx.host == HostClass::NativeMacOS {
        if let Some(identity) = &ctx.config.codesign_identity {
            cmd = cmd.args(["--codesign-identity", identity]);
        }
    }

    Ok(cmd.arg_path(entry))
}
