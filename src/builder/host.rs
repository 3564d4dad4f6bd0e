//! Host environment facts.
//!
//! Everything the resolver needs to know about the machine it runs on goes
//! through the [`Host`] trait so resolution can be exercised against a fake
//! host in tests.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::builder::errors::{BuildError, BuildResult};
use crate::util::process::ProcessBuilder;

/// Host operating-system family, named the way build directories spell it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Linux,
    Darwin,
    Other(String),
}

impl HostPlatform {
    /// Map a Rust `std::env::consts::OS` value.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => HostPlatform::Windows,
            "linux" => HostPlatform::Linux,
            "macos" => HostPlatform::Darwin,
            other => HostPlatform::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HostPlatform::Windows => "win",
            HostPlatform::Linux => "linux",
            HostPlatform::Darwin => "darwin",
            HostPlatform::Other(s) => s,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, HostPlatform::Windows)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HostPlatform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalize a machine string into the closed set of supported host architectures.
pub fn normalize_arch(machine: &str) -> BuildResult<&'static str> {
    match machine {
        "AMD64" | "x86_64" => Ok("x64"),
        "ARM64" => Ok("arm64"),
        other => Err(BuildError::UnknownHostArch {
            arch: other.to_string(),
        }),
    }
}

/// Read-only view of the host machine.
pub trait Host {
    /// Operating-system family.
    fn platform(&self) -> HostPlatform;

    /// Raw machine architecture string (`AMD64`, `x86_64`, `ARM64`, ...).
    fn machine(&self) -> String;

    /// Whether the driver itself is a 64-bit process.
    fn is_64bit(&self) -> bool;

    /// Look up an environment variable.
    fn env_var(&self, key: &str) -> Option<String>;

    /// Whether a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// Run a program and return its stdout. Non-zero exit is an error.
    fn capture(&self, program: &Path, args: &[String]) -> BuildResult<String>;

    /// Logical CPU count.
    fn cpu_count(&self) -> usize;

    /// Directory holding the running driver executable.
    fn driver_dir(&self) -> Option<PathBuf>;
}

/// The real machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn platform(&self) -> HostPlatform {
        HostPlatform::from_os(std::env::consts::OS)
    }

    fn machine(&self) -> String {
        // Rust reports one name per arch on every OS; report the spelling
        // the platform's own tooling uses.
        match (std::env::consts::ARCH, self.platform().is_windows()) {
            ("x86_64", true) => "AMD64".to_string(),
            ("aarch64", _) => "ARM64".to_string(),
            (arch, _) => arch.to_string(),
        }
    }

    fn is_64bit(&self) -> bool {
        cfg!(target_pointer_width = "64")
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn capture(&self, program: &Path, args: &[String]) -> BuildResult<String> {
        let pb = ProcessBuilder::new(program).args(args);
        let output = pb.exec()?;
        if !output.status.success() {
            return Err(BuildError::ToolFailed {
                command: pb.display_command(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    fn driver_dir(&self) -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}
