//! Isolated Python environment on native hosts.

use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::interpreter::{self, PACKAGER_MODULE};
use super::requirement_pins;
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::process::Cmd;

/// Interpreter inside the project's venv.
pub fn venv_python(ctx: &BuildContext) -> PathBuf {
    ctx.paths.venv_dir.join(ctx.strategy.venv_python)
}

/// Environment that activates the venv for one command.
///
/// Equivalent to sourcing `activate`, but scoped to the command it is
/// attached to.
pub fn activation_env(ctx: &BuildContext) -> Vec<(String, String)> {
    let python = venv_python(ctx);
    let bin_dir = python
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.paths.venv_dir.clone());

    let mut paths = vec![bin_dir];
    if let Some(current) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&current));
    }
    let path = std::env::join_paths(paths)
        .unwrap_or_else(|_| OsString::from(ctx.paths.venv_dir.as_os_str()));

    vec![
        (
            "VIRTUAL_ENV".to_string(),
            ctx.paths.venv_dir.to_string_lossy().into_owned(),
        ),
        ("PATH".to_string(), path.to_string_lossy().into_owned()),
    ]
}

fn with_env(cmd: Cmd, env: &[(String, String)]) -> Cmd {
    env.iter().fold(cmd, |cmd, (k, v)| cmd.env(k, v))
}

/// Create the venv if needed and make sure the packaging tool is importable.
pub fn ensure_local(ctx: &BuildContext) -> Result<()> {
    let python = venv_python(ctx);
    let python_str = python.to_string_lossy().into_owned();

    if python.exists() {
        println!("  [SKIP] Environment exists at {}", ctx.paths.venv_dir.display());
    } else {
        let host_python = &ctx.config.python;
        if ctx.invoker.locate(host_python).is_none() {
            return Err(BuildError::environment(
                format!("Host Python '{}' not found", host_python),
                "install Python 3 from https://www.python.org/downloads/ or set PYTHON",
            )
            .into());
        }
        let info = interpreter::probe(ctx.invoker, host_python).map_err(|e| {
            BuildError::environment(
                format!("Host Python '{}' is not available: {:#}", host_python, e),
                "install Python 3 or point PYTHON at an interpreter",
            )
        })?;
        interpreter::check_source(&info, "Host")?;

        println!(
            "  Creating environment with Python {} at {}",
            info.version,
            ctx.paths.venv_dir.display()
        );
        Cmd::new(host_python)
            .args(["-m", "venv"])
            .arg_path(&ctx.paths.venv_dir)
            .error_msg("Failed to create the isolated environment")
            .run_on(ctx.invoker)
            .map_err(|e| {
                BuildError::environment(
                    format!("{:#}", e),
                    format!(
                        "check that the 'venv' module is installed and {} is writable",
                        ctx.paths.root.display()
                    ),
                )
            })?;
    }

    let env = activation_env(ctx);
    if interpreter::can_import(ctx.invoker, &python_str, PACKAGER_MODULE) {
        println!("  [SKIP] {} already installed", PACKAGER_MODULE);
        return Ok(());
    }

    println!("  Installing dependencies...");
    let pins = requirement_pins(&ctx.paths.requirements)?;
    let install = Cmd::new(&python_str)
        .args(["-m", "pip", "install", "--disable-pip-version-check"])
        .args(&pins)
        .arg(&ctx.config.packager_requirement)
        .streaming()
        .error_msg("Dependency installation failed");
    with_env(install, &env).run_on(ctx.invoker).map_err(|e| {
        BuildError::environment(
            format!("{:#}", e),
            format!(
                "check network access and the pins in {}",
                ctx.paths.requirements.display()
            ),
        )
    })?;

    if !interpreter::can_import(ctx.invoker, &python_str, PACKAGER_MODULE) {
        return Err(BuildError::environment(
            format!("{} is still not importable after installation", PACKAGER_MODULE),
            format!(
                "delete {} and re-run, or install '{}' manually",
                ctx.paths.venv_dir.display(),
                ctx.config.packager_requirement
            ),
        )
        .into());
    }

    Ok(())
}
