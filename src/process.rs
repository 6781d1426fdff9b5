//! Centralized command execution with consistent error handling.
//!
//! Every external tool (python, PyInstaller, zip, powershell, wslpath, curl)
//! is described as a [`Cmd`] and executed through an [`Invoker`]. The real
//! implementation is [`SystemInvoker`]; tests substitute a fake that records
//! calls and simulates tool output.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, or -1 if terminated by signal.
    pub code: i32,
    /// Captured stdout as a string (empty for streamed commands).
    pub stdout: String,
    /// Captured stderr as a string (empty for streamed commands).
    pub stderr: String,
}

impl CommandResult {
    /// A successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Anything that can execute a [`Cmd`].
pub trait Invoker {
    /// Run the command to completion and report its exit code and output.
    ///
    /// Only spawn failures are errors here; a non-zero exit is a normal
    /// result and is interpreted by [`Cmd::run_on`].
    fn invoke(&self, cmd: &Cmd) -> Result<CommandResult>;

    /// Find `program` on the PATH (or verify an explicit path).
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Builder for configuring command execution.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    /// Inherit stdio instead of capturing.
    stream: bool,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
    /// Custom error message prefix.
    error_prefix: Option<String>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            stream: false,
            allow_fail: false,
            error_prefix: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set an environment variable for this command only.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.envs
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Stream output to the terminal instead of capturing it.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    /// Value following `flag` in the argument list, if any.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// True if `arg` appears verbatim in the argument list.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Run through `invoker`, failing on non-zero exit unless `allow_fail` is set.
    pub fn run_on(&self, invoker: &dyn Invoker) -> Result<CommandResult> {
        log::debug!("exec: {}", self);
        let result = invoker.invoke(self)?;

        if !self.allow_fail && !result.success() {
            let prefix = self
                .error_prefix
                .clone()
                .unwrap_or_else(|| format!("'{}' failed", self.program));

            let stderr = result.stderr_trimmed();
            if stderr.is_empty() {
                bail!("{} (exit code {})", prefix, result.code);
            } else {
                bail!("{} (exit code {}):\n{}", prefix, result.code, stderr);
            }
        }

        Ok(result)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInvoker;

impl Invoker for SystemInvoker {
    fn invoke(&self, cmd: &Cmd) -> Result<CommandResult> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &cmd.envs {
            command.env(key, value);
        }

        if cmd.stream {
            command.stdin(Stdio::inherit());
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());

            let status = command.status().with_context(|| {
                format!("Failed to execute '{}'. Is it installed?", cmd.program)
            })?;

            return Ok(CommandResult {
                code: status.code().unwrap_or(-1),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = command.output().with_context(|| {
            format!("Failed to execute '{}'. Is it installed?", cmd.program)
        })?;

        Ok(CommandResult {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
