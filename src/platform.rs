//! Host detection and the per-host strategy table.
//!
//! The host class is resolved once at startup from OS signals and then
//! passed to every component. Everything that differs between hosts
//! (artifact names, interpreter layout, compression, delegation) lives in
//! [`PlatformStrategy`], looked up from the resolved class.

use std::fmt;
use std::fs;

use crate::error::BuildError;

/// Host capability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostClass {
    NativeMacOS,
    NativeWindows,
    /// Linux under WSL: builds are delegated to the Windows side.
    LinuxBridge,
    Unsupported,
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NativeMacOS => "macOS (native)",
            Self::NativeWindows => "Windows (native)",
            Self::LinuxBridge => "Linux via WSL (delegating to Windows)",
            Self::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Raw OS identification signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsSignals {
    /// Kernel / OS name (`linux`, `macos`, `Darwin`, `MINGW64_NT-10.0`, ...).
    pub kernel_name: String,
    /// Kernel release string; on WSL it carries a `microsoft` marker.
    pub kernel_release: String,
}

impl OsSignals {
    pub fn new(kernel_name: impl Into<String>, kernel_release: impl Into<String>) -> Self {
        Self {
            kernel_name: kernel_name.into(),
            kernel_release: kernel_release.into(),
        }
    }

    /// Gather signals from the running host.
    pub fn current() -> Self {
        let kernel_name = std::env::consts::OS.to_string();
        let kernel_release = if kernel_name == "linux" {
            fs::read_to_string("/proc/sys/kernel/osrelease")
                .or_else(|_| fs::read_to_string("/proc/version"))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };
        Self {
            kernel_name,
            kernel_release,
        }
    }
}

/// Resolve the host class from OS signals. Pure.
pub fn resolve(signals: &OsSignals) -> HostClass {
    let name = signals.kernel_name.to_ascii_lowercase();
    let release = signals.kernel_release.to_ascii_lowercase();

    if name == "macos" || name == "darwin" {
        HostClass::NativeMacOS
    } else if name == "windows"
        || name.starts_with("mingw")
        || name.starts_with("msys")
        || name.starts_with("cygwin")
    {
        HostClass::NativeWindows
    } else if name == "linux" && (release.contains("microsoft") || release.contains("wsl")) {
        HostClass::LinuxBridge
    } else {
        HostClass::Unsupported
    }
}

/// Resolve and reject unsupported hosts.
pub fn resolve_supported(signals: &OsSignals) -> Result<HostClass, BuildError> {
    match resolve(signals) {
        HostClass::Unsupported => Err(BuildError::UnsupportedPlatform {
            kernel_name: signals.kernel_name.clone(),
            kernel_release: if signals.kernel_release.is_empty() {
                "no release info".to_string()
            } else {
                signals.kernel_release.clone()
            },
        }),
        host => Ok(host),
    }
}

/// How a directory bundle is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compressor {
    /// `zip -r -q -y`, run inside the bundle directory.
    Zip,
    /// PowerShell `Compress-Archive`.
    CompressArchive,
}

/// Everything that varies per host, resolved once.
#[derive(Debug, PartialEq, Eq)]
pub struct PlatformStrategy {
    /// Platform label used in artifact names (`macos`, `windows`).
    pub label: &'static str,
    /// Name passed to the packaging tool for the launcher.
    pub launcher_name: &'static str,
    /// File the packaging tool produces for the launcher.
    pub launcher_file: &'static str,
    /// Onedir name (and executable stem) of the app.
    pub app_name: &'static str,
    /// Executable inside the app bundle.
    pub app_exe: &'static str,
    /// Final compressed app archive.
    pub app_archive: &'static str,
    /// Separator for `--add-data SRC<sep>DEST`.
    pub data_separator: &'static str,
    /// Interpreter path inside a venv.
    pub venv_python: &'static str,
    pub compressor: Compressor,
    /// Whether the app bundles the UnRAR helper.
    pub bundles_unrar: bool,
    /// Whether packaging runs remotely.
    pub delegated: bool,
}

const MACOS: PlatformStrategy = PlatformStrategy {
    label: "macos",
    launcher_name: "synchotic-launcher-macos",
    launcher_file: "synchotic-launcher-macos",
    app_name: "synchotic-app",
    app_exe: "synchotic-app",
    app_archive: "app-macos.zip",
    data_separator: ":",
    venv_python: "bin/python3",
    compressor: Compressor::Zip,
    bundles_unrar: false,
    delegated: false,
};

const WINDOWS: PlatformStrategy = PlatformStrategy {
    label: "windows",
    launcher_name: "synchotic-launcher",
    launcher_file: "synchotic-launcher.exe",
    app_name: "synchotic-app",
    app_exe: "synchotic-app.exe",
    app_archive: "app-windows.zip",
    data_separator: ";",
    venv_python: "Scripts/python.exe",
    compressor: Compressor::CompressArchive,
    bundles_unrar: true,
    delegated: false,
};

const BRIDGE: PlatformStrategy = PlatformStrategy {
    delegated: true,
    ..WINDOWS
};

impl HostClass {
    /// Strategy for this host, `None` for [`HostClass::Unsupported`].
    pub fn strategy(self) -> Option<&'static PlatformStrategy> {
        match self {
            Self::NativeMacOS => Some(&MACOS),
            Self::NativeWindows => Some(&WINDOWS),
            Self::LinuxBridge => Some(&BRIDGE),
            Self::Unsupported => None,
        }
    }
}
