//! Failure categories for the build pipeline.
//!
//! Components return `anyhow::Result`; when a failure belongs to one of the
//! categories below it is raised as a [`BuildError`] so callers can tell them
//! apart with `downcast_ref`.

use thiserror::Error;

use crate::packager::BuildMode;

#[derive(Error, Debug)]
pub enum BuildError {
    /// The host OS is not one of the supported classes.
    #[error("Unsupported platform: {kernel_name} ({kernel_release})\n  Supported hosts: macOS, Windows, Linux under WSL")]
    UnsupportedPlatform {
        kernel_name: String,
        kernel_release: String,
    },

    /// A required interpreter or tool is missing or unusable.
    #[error("{what}\n  hint: {hint}")]
    Environment { what: String, hint: String },

    /// The packaging tool failed or could not be started.
    #[error("Packaging failed for {mode} ({entry_point}): {detail}")]
    Packaging {
        mode: BuildMode,
        entry_point: String,
        detail: String,
    },

    /// The delegated Windows build failed.
    #[error("Bridge build failed: {0}")]
    Bridge(String),

    /// Post-processing of a packaged output failed.
    #[error("Finalize failed for {mode}: {reason}")]
    Finalize { mode: BuildMode, reason: String },

    /// Bad command-line input.
    #[error("{0}")]
    Input(String),
}

impl BuildError {
    pub fn environment(what: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Environment {
            what: what.into(),
            hint: hint.into(),
        }
    }

    /// Short label for the failure category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform { .. } | Self::Environment { .. } => "environment",
            Self::Packaging { .. } => "packaging",
            Self::Bridge(_) => "bridge",
            Self::Finalize { .. } => "finalize",
            Self::Input(_) => "input",
        }
    }
}

/// Category of an `anyhow::Error`, if it carries a [`BuildError`].
pub fn category_of(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|e| e.downcast_ref::<BuildError>())
        .map(BuildError::category)
}
