//! Shared test utilities for synchotic-build tests.
//!
//! `FakeInvoker` stands in for every external tool. It records each command
//! and simulates just enough of python, PyInstaller, zip, PowerShell, wslpath
//! and curl for the pipeline to run end to end inside a temp dir.

#![allow(dead_code)]

use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use synchotic_build::config::Config;
use synchotic_build::context::BuildContext;
use synchotic_build::platform::HostClass;
use synchotic_build::process::{Cmd, CommandResult, Invoker};

/// Windows temp dir reported by the fake `GetTempPath()`.
pub const WINDOWS_TEMP: &str = "C:\\Users\\dev\\AppData\\Local\\Temp\\";

/// Test environment: a project tree plus a directory standing in for `C:\`.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Project root with sync.py, launcher.py, VERSION, ...
    pub root: PathBuf,
    /// Where `C:\` is mounted for the fake wslpath
    pub windows_root: PathBuf,
    /// User cache dir for fetched helpers
    pub cache_dir: PathBuf,
    /// Scratch directory for dev targets
    pub scratch: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let root = base.join("project");
        let windows_root = base.join("mnt-c");
        let cache_dir = base.join("cache");
        let scratch = base.join("scratch");

        fs::create_dir_all(root.join("src/sync")).expect("Failed to create project");
        fs::create_dir_all(&windows_root).expect("Failed to create windows root");
        fs::create_dir_all(&scratch).expect("Failed to create scratch");

        fs::write(root.join("sync.py"), "from src.sync import main\nmain()\n").unwrap();
        fs::write(root.join("launcher.py"), "print('launcher')\n").unwrap();
        fs::write(root.join("VERSION"), "1.4.0\n").unwrap();
        fs::write(root.join("drives.json"), "{\"drives\": []}\n").unwrap();
        fs::write(root.join("requirements.txt"), "requests==2.31.0\nrarfile==4.1\n").unwrap();
        fs::write(root.join("src/sync/__init__.py"), "def main(): pass\n").unwrap();

        Self {
            _temp_dir: temp_dir,
            root,
            windows_root,
            cache_dir,
            scratch,
        }
    }

    pub fn config(&self) -> Config {
        Config::from_vars(&self.root, &HashMap::new())
    }

    pub fn config_with(&self, vars: &[(&str, &str)]) -> Config {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(&self.root, &vars)
    }

    /// A fake invoker behaving like the tools on `host`.
    pub fn invoker(&self, host: HostClass) -> FakeInvoker {
        FakeInvoker::new(self.windows_root.clone(), host != HostClass::NativeMacOS)
    }

    /// Build context with the helper cache redirected into the temp dir.
    pub fn context<'a>(
        &self,
        config: &'a Config,
        host: HostClass,
        invoker: &'a FakeInvoker,
    ) -> BuildContext<'a> {
        let mut ctx = BuildContext::new(config, host, invoker).expect("supported host");
        ctx.paths.cache_dir = self.cache_dir.clone();
        ctx
    }

    /// Put a vendored UnRAR helper in place so nothing is fetched.
    pub fn vendor_unrar(&self) -> PathBuf {
        let path = self.root.join("libs/bin/UnRAR.exe");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "MZ unrar").unwrap();
        path
    }

    pub fn dist(&self) -> PathBuf {
        self.root.join("dist")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Local view of the Windows temp dir.
    pub fn windows_temp_local(&self) -> PathBuf {
        windows_to_local(&self.windows_root, WINDOWS_TEMP)
    }

    /// Bridge session dirs currently present on the Windows side.
    pub fn bridge_sessions(&self) -> Vec<PathBuf> {
        let temp = self.windows_temp_local();
        if !temp.exists() {
            return Vec::new();
        }
        fs::read_dir(temp)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("synchotic-build-")
            })
            .collect()
    }
}

/// Map `C:\a\b` onto `<windows_root>/a/b`.
pub fn windows_to_local(windows_root: &Path, windows_path: &str) -> PathBuf {
    let rest = windows_path
        .trim_start_matches("C:")
        .trim_start_matches("c:")
        .trim_matches('\\');
    rest.split('\\')
        .filter(|s| !s.is_empty())
        .fold(windows_root.to_path_buf(), |p, seg| p.join(seg))
}

/// Scripted stand-in for every external tool.
pub struct FakeInvoker {
    pub calls: RefCell<Vec<Cmd>>,
    windows_root: PathBuf,
    /// PyInstaller on Windows appends `.exe` to its outputs.
    exe_suffix: bool,
    /// Whether `import PyInstaller` currently succeeds.
    pub packager_importable: Cell<bool>,
    /// Whether pip install makes PyInstaller importable.
    pub pip_fixes_import: Cell<bool>,
    /// Exit code of pip install.
    pub pip_exit: Cell<i32>,
    /// Exit code of the PyInstaller run.
    pub packager_exit: Cell<i32>,
    /// Exit code of the remote build script.
    pub remote_exit: Cell<i32>,
    /// Whether the remote build leaves its artifact behind.
    pub remote_produces: Cell<bool>,
    /// Whether the mirrored source held UnRAR.exe when the remote build ran.
    pub remote_saw_unrar: Cell<bool>,
    /// `sys.executable` reported by the interpreter probe.
    pub interpreter_executable: RefCell<String>,
    /// Programs `locate` pretends are absent.
    pub missing: RefCell<Vec<String>>,
}

impl FakeInvoker {
    pub fn new(windows_root: PathBuf, exe_suffix: bool) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            windows_root,
            exe_suffix,
            packager_importable: Cell::new(false),
            pip_fixes_import: Cell::new(true),
            pip_exit: Cell::new(0),
            packager_exit: Cell::new(0),
            remote_exit: Cell::new(0),
            remote_produces: Cell::new(true),
            remote_saw_unrar: Cell::new(false),
            interpreter_executable: RefCell::new("/usr/bin/python3".to_string()),
            missing: RefCell::new(Vec::new()),
        }
    }

    pub fn set_missing(&self, program: &str) {
        self.missing.borrow_mut().push(program.to_string());
    }

    /// Recorded calls whose args contain `needle`.
    pub fn calls_with(&self, needle: &str) -> Vec<Cmd> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.has_arg(needle))
            .cloned()
            .collect()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Cmd> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program() == program)
            .cloned()
            .collect()
    }

    pub fn packager_calls(&self) -> Vec<Cmd> {
        self.calls_with("PyInstaller")
            .into_iter()
            .filter(|c| c.has_arg("--noconfirm"))
            .collect()
    }

    fn python(&self, cmd: &Cmd) -> Result<CommandResult> {
        let args = cmd.get_args();
        match args.first().map(String::as_str) {
            Some("-c") => {
                let script = args.get(1).map(String::as_str).unwrap_or("");
                if script.contains("json.dumps") {
                    let exe = self.interpreter_executable.borrow().replace('\\', "\\\\");
                    return Ok(CommandResult::ok(format!(
                        "{{\"executable\": \"{}\", \"version\": \"3.12.4\", \"prefix\": \"/usr\"}}\n",
                        exe
                    )));
                }
                if self.packager_importable.get() {
                    Ok(CommandResult::ok(""))
                } else {
                    Ok(CommandResult::failed(
                        1,
                        "ModuleNotFoundError: No module named 'PyInstaller'",
                    ))
                }
            }
            Some("-m") => match args.get(1).map(String::as_str) {
                Some("venv") => {
                    let dir = PathBuf::from(&args[2]);
                    for exe in ["bin/python3", "Scripts/python.exe"] {
                        let path = dir.join(exe);
                        fs::create_dir_all(path.parent().unwrap())?;
                        fs::write(path, "")?;
                    }
                    Ok(CommandResult::ok(""))
                }
                Some("pip") => {
                    if self.pip_exit.get() != 0 {
                        return Ok(CommandResult::failed(self.pip_exit.get(), ""));
                    }
                    if self.pip_fixes_import.get() {
                        self.packager_importable.set(true);
                    }
                    Ok(CommandResult::ok(""))
                }
                Some("PyInstaller") => self.pyinstaller(cmd),
                _ => Ok(CommandResult::failed(1, "No module named that")),
            },
            _ => Ok(CommandResult::failed(2, "unexpected python invocation")),
        }
    }

    fn pyinstaller(&self, cmd: &Cmd) -> Result<CommandResult> {
        let work = PathBuf::from(cmd.arg_after("--workpath").unwrap());
        fs::create_dir_all(work.join("partial"))?;

        if self.packager_exit.get() != 0 {
            return Ok(CommandResult::failed(self.packager_exit.get(), ""));
        }

        let dist = PathBuf::from(cmd.arg_after("--distpath").unwrap());
        let name = cmd.arg_after("--name").unwrap();
        fs::create_dir_all(&dist)?;
        let exe = if self.exe_suffix {
            format!("{}.exe", name)
        } else {
            name.to_string()
        };

        if cmd.has_arg("--onefile") {
            fs::write(dist.join(&exe), "frozen launcher")?;
        } else {
            let bundle = dist.join(name);
            fs::create_dir_all(bundle.join("_internal"))?;
            fs::write(bundle.join(&exe), "frozen app")?;
            fs::write(bundle.join("_internal/base_library.zip"), "stdlib")?;
        }
        fs::write(work.join(format!("{}.spec", name)), "# spec")?;
        Ok(CommandResult::ok(""))
    }

    fn powershell_remote(&self, cmd: &Cmd) -> Result<CommandResult> {
        let args = cmd.get_args();
        if args.iter().any(|a| a.contains("GetTempPath")) {
            return Ok(CommandResult::ok(format!("{}\r\n", WINDOWS_TEMP)));
        }

        let source = windows_to_local(&self.windows_root, cmd.arg_after("-SourceDir").unwrap());
        self.remote_saw_unrar
            .set(source.join("libs/bin/UnRAR.exe").is_file());

        if self.remote_exit.get() != 0 {
            return Ok(CommandResult::failed(self.remote_exit.get(), "remote build failed"));
        }
        if !self.remote_produces.get() {
            return Ok(CommandResult::ok(""));
        }

        let build = windows_to_local(&self.windows_root, cmd.arg_after("-BuildDir").unwrap());
        let dist = build.join("dist");
        fs::create_dir_all(&dist)?;
        let file = match cmd.arg_after("-Mode") {
            Some("app") => "app-windows.zip",
            _ => "synchotic-launcher.exe",
        };
        fs::write(dist.join(file), "remote artifact")?;
        Ok(CommandResult::ok(""))
    }

    fn compress_archive(&self, cmd: &Cmd) -> Result<CommandResult> {
        let script = cmd.get_args().last().cloned().unwrap_or_default();
        let raw = between(&script, "-Path '", "\\*'").unwrap();
        let dest = between(&script, "-DestinationPath '", "'").unwrap();
        if !Path::new(&raw).is_dir() {
            return Ok(CommandResult::failed(1, "path not found"));
        }
        fs::write(dest, listing(Path::new(&raw)))?;
        Ok(CommandResult::ok(""))
    }

    fn zip(&self, cmd: &Cmd) -> Result<CommandResult> {
        let cwd = cmd.current_dir().unwrap().to_path_buf();
        let archive = PathBuf::from(&cmd.get_args()[3]);
        fs::write(archive, listing(&cwd))?;
        Ok(CommandResult::ok(""))
    }
}

fn between(s: &str, start: &str, end: &str) -> Option<String> {
    let from = s.find(start)? + start.len();
    let len = s[from..].find(end)?;
    Some(s[from..from + len].to_string())
}

/// Archive stand-in: the relative paths that would be stored.
fn listing(dir: &Path) -> String {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                out.push(path.strip_prefix(base).unwrap().display().to_string());
            }
        }
    }
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out.join("\n")
}

impl Invoker for FakeInvoker {
    fn invoke(&self, cmd: &Cmd) -> Result<CommandResult> {
        self.calls.borrow_mut().push(cmd.clone());

        match cmd.program() {
            "powershell.exe" => self.powershell_remote(cmd),
            "powershell" => self.compress_archive(cmd),
            "zip" => self.zip(cmd),
            "wslpath" => {
                let win = cmd.arg_after("-u").unwrap();
                Ok(CommandResult::ok(
                    windows_to_local(&self.windows_root, win).display().to_string(),
                ))
            }
            "curl" => {
                let out = cmd.arg_after("-o").unwrap();
                fs::write(out, "MZ fetched unrar")?;
                Ok(CommandResult::ok(""))
            }
            _ => self.python(cmd),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.borrow().iter().any(|m| m == program) {
            None
        } else {
            Some(PathBuf::from(program))
        }
    }
}
