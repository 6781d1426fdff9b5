//! Windows interop from inside WSL.

use anyhow::Result;
use std::path::PathBuf;

use crate::error::BuildError;
use crate::process::{Cmd, Invoker};

pub const POWERSHELL: &str = "powershell.exe";

/// Fail early when Windows interop tools are not reachable.
pub fn require_interop(invoker: &dyn Invoker) -> Result<(), BuildError> {
    for tool in [POWERSHELL, "wslpath"] {
        if invoker.locate(tool).is_none() {
            return Err(BuildError::environment(
                format!("'{}' not found; Windows interop is unavailable", tool),
                "enable interop in /etc/wsl.conf ([interop] enabled=true) and restart WSL",
            ));
        }
    }
    Ok(())
}

/// The Windows user's temp directory, without a trailing separator.
pub fn windows_temp_dir(invoker: &dyn Invoker) -> Result<String> {
    let result = Cmd::new(POWERSHELL)
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            "[System.IO.Path]::GetTempPath()",
        ])
        .error_msg("Could not query the Windows temp directory")
        .run_on(invoker)
        .map_err(|e| BuildError::Bridge(format!("{:#}", e)))?;

    let temp = result.stdout_trimmed().trim_end_matches('\\');
    if temp.is_empty() {
        return Err(BuildError::Bridge("Windows reported an empty temp directory".into()).into());
    }
    Ok(temp.to_string())
}

/// Translate a Windows path into its WSL mount path.
pub fn to_linux(invoker: &dyn Invoker, windows_path: &str) -> Result<PathBuf> {
    let result = Cmd::new("wslpath")
        .args(["-u", windows_path])
        .error_msg(format!("wslpath could not translate '{}'", windows_path))
        .run_on(invoker)
        .map_err(|e| BuildError::Bridge(format!("{:#}", e)))?;
    Ok(PathBuf::from(result.stdout_trimmed()))
}

/// Join Windows path segments.
pub fn join(base: &str, child: &str) -> String {
    format!("{}\\{}", base.trim_end_matches('\\'), child)
}
