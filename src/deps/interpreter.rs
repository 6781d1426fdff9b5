//! Python interpreter probing.
//!
//! The interpreter answers a tiny script with a JSON description of itself;
//! that tells us it is reachable and where it was installed from.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::BuildError;
use crate::process::{Cmd, Invoker};

/// Module name the packaging tool is imported as.
pub const PACKAGER_MODULE: &str = "PyInstaller";

const PROBE_SCRIPT: &str = "import json, sys; print(json.dumps({\
\"executable\": sys.executable, \
\"version\": \"%d.%d.%d\" % tuple(sys.version_info[:3]), \
\"prefix\": sys.prefix}))";

/// What an interpreter reports about itself.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InterpreterInfo {
    pub executable: String,
    pub version: String,
    pub prefix: String,
}

impl InterpreterInfo {
    /// Microsoft Store builds live under `WindowsApps` and run sandboxed;
    /// PyInstaller cannot freeze from them.
    pub fn is_store_install(&self) -> bool {
        let exe = self.executable.to_ascii_lowercase();
        exe.contains("\\windowsapps\\") || exe.contains("/windowsapps/")
    }
}

/// Ask `python` to describe itself.
pub fn probe(invoker: &dyn Invoker, python: &str) -> Result<InterpreterInfo> {
    let result = Cmd::new(python)
        .args(["-c", PROBE_SCRIPT])
        .error_msg(format!("'{}' did not answer the interpreter probe", python))
        .run_on(invoker)?;

    parse_probe(result.stdout_trimmed())
        .with_context(|| format!("Unexpected interpreter probe output from '{}'", python))
}

/// Parse the probe's JSON line. Anything printed before it (site banners) is ignored.
pub fn parse_probe(stdout: &str) -> Result<InterpreterInfo> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or(stdout);
    Ok(serde_json::from_str(line.trim())?)
}

/// Reject interpreters installed from a source the packaging tool can't work with.
pub fn check_source(info: &InterpreterInfo, label: &str) -> Result<(), BuildError> {
    if info.is_store_install() {
        return Err(BuildError::environment(
            format!(
                "{} Python {} was installed from the Microsoft Store ({}), which PyInstaller cannot package from",
                label, info.version, info.executable
            ),
            "install Python from https://www.python.org/downloads/ and disable the Store app execution alias",
        ));
    }
    Ok(())
}

/// Whether `module` can be imported by `python`.
pub fn can_import(invoker: &dyn Invoker, python: &str, module: &str) -> bool {
    match Cmd::new(python)
        .args(["-c", &format!("import {}", module)])
        .allow_fail()
        .run_on(invoker)
    {
        Ok(result) => result.success(),
        Err(e) => {
            log::debug!("import check for {} via {} failed: {:#}", module, python, e);
            false
        }
    }
}
