//! Configuration management for synchotic-build.
//!
//! Reads configuration from a `.env` file in the project root and from
//! environment variables. Environment variables take precedence over `.env`.
//! Nothing is written back into the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Product name used for every artifact.
pub const PRODUCT: &str = "synchotic";

/// Environment variable selecting the project root (default: current dir).
pub const ROOT_ENV: &str = "SYNCHOTIC_BUILD_ROOT";

/// Requirement spec for the packaging tool, installed next to `requirements.txt`.
pub const DEFAULT_PACKAGER_REQUIREMENT: &str = "pyinstaller";

/// Where the UnRAR command-line tool is fetched from when not vendored.
pub const DEFAULT_UNRAR_URL: &str =
    "https://github.com/noahbaxter/synchotic/releases/download/tools/UnRAR.exe";

/// Build configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root holding `sync.py`, `launcher.py`, `VERSION`, ...
    pub root: PathBuf,
    /// Product name (artifact prefix).
    pub product: String,
    /// Host interpreter used to create the isolated environment.
    pub python: String,
    /// Interpreter reachable inside the Windows context (LinuxBridge only).
    pub remote_python: String,
    /// Requirement spec for the packaging tool.
    pub packager_requirement: String,
    /// Download URL for the Windows archive helper.
    pub unrar_url: String,
    /// macOS signing identity, forwarded to the packaging tool when set.
    pub codesign_identity: Option<String>,
}

impl Config {
    /// Load configuration for the project at `root`.
    pub fn load(root: &Path) -> Self {
        let mut vars = HashMap::new();

        let env_path = root.join(".env");
        if env_path.exists() {
            match dotenvy::from_path_iter(&env_path) {
                Ok(iter) => {
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                vars.insert(key, value);
                            }
                            Err(e) => {
                                log::warn!("Skipping malformed line in {}: {}", env_path.display(), e)
                            }
                        }
                    }
                }
                Err(e) => log::warn!("Could not read {}: {}", env_path.display(), e),
            }
        }

        // Environment variables override .env file
        vars.extend(std::env::vars());

        Self::from_vars(root, &vars)
    }

    /// Build a config from an explicit variable map (defaults for anything missing).
    pub fn from_vars(root: &Path, vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();

        let default_python = if cfg!(windows) { "python" } else { "python3" };

        Self {
            root: root.to_path_buf(),
            product: PRODUCT.to_string(),
            python: get("PYTHON").unwrap_or_else(|| default_python.to_string()),
            remote_python: get("REMOTE_PYTHON").unwrap_or_else(|| "python.exe".to_string()),
            packager_requirement: get("PACKAGER_REQUIREMENT")
                .unwrap_or_else(|| DEFAULT_PACKAGER_REQUIREMENT.to_string()),
            unrar_url: get("UNRAR_URL").unwrap_or_else(|| DEFAULT_UNRAR_URL.to_string()),
            codesign_identity: get("MACOS_CODESIGN_IDENTITY"),
        }
    }

    /// Resolve the project root from `SYNCHOTIC_BUILD_ROOT` or the current directory.
    ///
    /// Always absolute: tools are started with their own working directory.
    pub fn resolve_root() -> std::io::Result<PathBuf> {
        match std::env::var_os(ROOT_ENV) {
            Some(root) if !root.is_empty() => std::path::absolute(PathBuf::from(root)),
            _ => std::env::current_dir(),
        }
    }

    /// Log the effective configuration.
    pub fn print(&self) {
        log::debug!("Configuration:");
        log::debug!("  root: {}", self.root.display());
        log::debug!("  PYTHON: {}", self.python);
        log::debug!("  REMOTE_PYTHON: {}", self.remote_python);
        log::debug!("  PACKAGER_REQUIREMENT: {}", self.packager_requirement);
        log::debug!("  UNRAR_URL: {}", self.unrar_url);
        match &self.codesign_identity {
            Some(id) => log::debug!("  MACOS_CODESIGN_IDENTITY: {}", id),
            None => log::debug!("  MACOS_CODESIGN_IDENTITY: (unset)"),
        }
    }
}
