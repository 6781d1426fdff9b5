//! Provisioning inside the Windows context for WSL-hosted builds.
//!
//! Nothing is installed locally. The Windows interpreter is reached through
//! WSL interop and checked the same way a native one is.

use anyhow::Result;

use super::interpreter::{self, PACKAGER_MODULE};
use super::requirement_pins;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::process::Cmd;

/// Verify the remote interpreter and install the packaging tool into it if missing.
pub fn ensure_remote(ctx: &BuildContext) -> Result<()> {
    let python = &ctx.config.remote_python;
    let hint = "install Python from python.org on Windows, keep it on the Windows PATH, \
                and leave WSL interop enabled (or set REMOTE_PYTHON)";

    if ctx.invoker.locate(python).is_none() {
        return Err(BuildError::environment(
            format!("Windows interpreter '{}' is not visible from WSL", python),
            hint,
        )
        .into());
    }

    let info = interpreter::probe(ctx.invoker, python).map_err(|e| {
        BuildError::environment(
            format!("Windows interpreter '{}' is unreachable from WSL: {:#}", python, e),
            hint,
        )
    })?;
    interpreter::check_source(&info, "Remote")?;
    println!("  Remote Python {} at {}", info.version, info.executable);

    if interpreter::can_import(ctx.invoker, python, PACKAGER_MODULE) {
        println!("  [SKIP] {} already installed (remote)", PACKAGER_MODULE);
        return Ok(());
    }

    println!("  Installing dependencies in the Windows environment...");
    let pins = requirement_pins(&ctx.paths.requirements)?;
    Cmd::new(python)
        .args(["-m", "pip", "install", "--disable-pip-version-check"])
        .args(&pins)
        .arg(&ctx.config.packager_requirement)
        .streaming()
        .error_msg("Remote dependency installation failed")
        .run_on(ctx.invoker)
        .map_err(|e| {
            BuildError::environment(
                format!("{:#}", e),
                format!(
                    "check network access from Windows and the pins in {}",
                    ctx.paths.requirements.display()
                ),
            )
        })?;

    if !interpreter::can_import(ctx.invoker, python, PACKAGER_MODULE) {
        return Err(BuildError::environment(
            format!(
                "{} is still not importable by the Windows interpreter after installation",
                PACKAGER_MODULE
            ),
            format!("run '{} -m pip install {}' on Windows", python, ctx.config.packager_requirement),
        )
        .into());
    }

    Ok(())
}
