//! synchotic-build - packages the synchotic launcher and app.
//!
//! Produces, in `dist/`:
//! - the launcher, a single-file executable
//! - the app, a directory bundle compressed to `app-<platform>.zip`
//!
//! On WSL the build is delegated to the Windows side.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

use synchotic_build::commands;
use synchotic_build::config::Config;
use synchotic_build::error::category_of;
use synchotic_build::packager::BuildMode;
use synchotic_build::platform::{self, OsSignals};
use synchotic_build::process::SystemInvoker;
use synchotic_build::stage;

#[derive(Parser)]
#[command(name = "synchotic-build")]
#[command(version, about = "Build the synchotic launcher and app")]
#[command(
    after_help = "QUICK START:\n  synchotic-build               Build the app (default)\n  synchotic-build launcher      Build the launcher\n  synchotic-build dev ~/test    Build both and copy them into ~/test\n  synchotic-build --clean       Remove build/, dist/ and caches"
)]
struct Cli {
    /// What to build
    #[arg(value_enum)]
    mode: Option<Mode>,

    /// Target directory (dev only)
    target: Option<PathBuf>,

    /// Remove all generated build state and exit
    #[arg(long, conflicts_with_all = ["mode", "target"])]
    clean: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Package the app bundle (default)
    App,
    /// Package the launcher
    Launcher,
    /// Build both and stage them into a target directory
    Dev,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match category_of(&e) {
            Some(category) => eprintln!("Error ({}): {:#}", category, e),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = Config::resolve_root()?;

    if cli.clean {
        return commands::cmd_clean(&root);
    }

    let mode = cli.mode.unwrap_or(Mode::App);

    // Input problems are reported before anything touches the host.
    let dev_target = match (mode, &cli.target) {
        (Mode::Dev, Some(target)) => Some(stage::resolve_target(target)?),
        (Mode::Dev, None) => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "dev requires a target directory",
            )
            .exit(),
        (_, Some(target)) => Cli::command()
            .error(
                ErrorKind::UnknownArgument,
                format!("unexpected argument '{}'", target.display()),
            )
            .exit(),
        (_, None) => None,
    };

    let config = Config::load(&root);
    config.print();

    let host = platform::resolve_supported(&OsSignals::current())?;
    let invoker = SystemInvoker;

    match (mode, dev_target) {
        (Mode::Dev, Some(target)) => {
            commands::cmd_dev(&config, host, &invoker, &target)?;
        }
        (Mode::Launcher, _) => {
            commands::cmd_build(&config, host, &invoker, BuildMode::Launcher)?;
        }
        _ => {
            commands::cmd_build(&config, host, &invoker, BuildMode::App)?;
        }
    }

    Ok(())
}
