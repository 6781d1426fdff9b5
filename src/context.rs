//! Explicit build context threaded through every component.
//!
//! Holds the resolved host class, its strategy, the configuration, the
//! process invoker and the well-known project paths. Components never look
//! at the ambient process state (cwd, env) themselves.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::BuildError;
use crate::platform::{HostClass, PlatformStrategy};
use crate::process::Invoker;

/// Well-known locations under the project root.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub root: PathBuf,
    /// Scratch directory for the packaging tool (`--workpath`).
    pub build_dir: PathBuf,
    /// Output directory for artifacts (`--distpath`).
    pub dist_dir: PathBuf,
    /// Isolated Python environment.
    pub venv_dir: PathBuf,
    pub requirements: PathBuf,
    pub version_file: PathBuf,
    /// Vendored Windows archive helper.
    pub vendored_unrar: PathBuf,
    /// Per-user cache for fetched helpers.
    pub cache_dir: PathBuf,
}

impl BuildPaths {
    pub fn new(root: &Path) -> Self {
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join("synchotic-build"))
            .unwrap_or_else(|| root.join(".cache"));

        Self {
            root: root.to_path_buf(),
            build_dir: root.join("build"),
            dist_dir: root.join("dist"),
            venv_dir: root.join(".venv"),
            requirements: root.join("requirements.txt"),
            version_file: root.join("VERSION"),
            vendored_unrar: root.join("libs/bin/UnRAR.exe"),
            cache_dir,
        }
    }
}

/// Everything a build step needs.
pub struct BuildContext<'a> {
    pub config: &'a Config,
    pub host: HostClass,
    pub strategy: &'static PlatformStrategy,
    pub invoker: &'a dyn Invoker,
    pub paths: BuildPaths,
}

impl<'a> BuildContext<'a> {
    /// Create a context for a supported host.
    pub fn new(config: &'a Config, host: HostClass, invoker: &'a dyn Invoker) -> Result<Self> {
        let strategy = host.strategy().ok_or_else(|| {
            BuildError::environment(
                "No build strategy for an unsupported host",
                "run on macOS, Windows, or Linux under WSL",
            )
        })?;

        Ok(Self {
            config,
            host,
            strategy,
            invoker,
            paths: BuildPaths::new(&config.root),
        })
    }
}
