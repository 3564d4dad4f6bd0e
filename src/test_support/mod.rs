//! Test doubles for the host and script-runner seams.
//!
//! # Example
//!
//! ```rust,ignore
//! use gsbuild::test_support::{vs_install, FakeHost, ScriptedRunner};
//!
//! #[test]
//! fn test_example() {
//!     let host = vs_install(FakeHost::windows(), "2019").with_cpus(8);
//!     let info = BuildInfo::resolve(&BuildRequest::default(), &host).unwrap();
//!
//!     // First configure attempt fails, the retry succeeds.
//!     let runner = ScriptedRunner::new([1, 0, 0]);
//!     // ...
//! }
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::builder::batch::ScriptRunner;
use crate::builder::errors::{BuildError, BuildResult};
use crate::builder::host::{Host, HostPlatform};
use crate::util::shell::{ColorChoice, PausePolicy, Shell};

pub use fixtures::*;

/// In-memory host.
///
/// Captured program output is keyed by a substring of the full invocation
/// (`"<program> <args>"`); the first matching key wins.
#[derive(Debug)]
pub struct FakeHost {
    platform: HostPlatform,
    machine: String,
    is_64bit: bool,
    env: HashMap<String, String>,
    files: HashSet<PathBuf>,
    captures: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
    cpus: usize,
    driver_dir: Option<PathBuf>,
}

impl FakeHost {
    fn new(platform: HostPlatform, machine: &str) -> Self {
        FakeHost {
            platform,
            machine: machine.to_string(),
            is_64bit: true,
            env: HashMap::new(),
            files: HashSet::new(),
            captures: Vec::new(),
            calls: Mutex::new(Vec::new()),
            cpus: 4,
            driver_dir: Some(PathBuf::from("/opt/gsbuild/bin")),
        }
    }

    /// A 64-bit Windows machine with nothing installed.
    pub fn windows() -> Self {
        FakeHost::new(HostPlatform::Windows, "AMD64")
    }

    /// A 64-bit Linux machine with nothing installed.
    pub fn linux() -> Self {
        FakeHost::new(HostPlatform::Linux, "x86_64")
    }

    pub fn with_machine(mut self, machine: &str) -> Self {
        self.machine = machine.to_string();
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    /// Answer any invocation containing `key` with `output`.
    pub fn with_capture(mut self, key: impl Into<String>, output: impl Into<String>) -> Self {
        self.captures.push((key.into(), output.into()));
        self
    }

    pub fn with_cpus(mut self, cpus: usize) -> Self {
        self.cpus = cpus;
        self
    }

    pub fn with_32bit_driver(mut self) -> Self {
        self.is_64bit = false;
        self
    }

    /// Every captured invocation, as `"<program> <args>"`.
    pub fn captured(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Host for FakeHost {
    fn platform(&self) -> HostPlatform {
        self.platform.clone()
    }

    fn machine(&self) -> String {
        self.machine.clone()
    }

    fn is_64bit(&self) -> bool {
        self.is_64bit
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn capture(&self, program: &Path, args: &[String]) -> BuildResult<String> {
        let mut invocation = program.display().to_string();
        for arg in args {
            invocation.push(' ');
            invocation.push_str(arg);
        }
        self.calls.lock().unwrap().push(invocation.clone());

        self.captures
            .iter()
            .find(|(key, _)| invocation.contains(key.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| BuildError::Spawn {
                command: invocation,
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            })
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }

    fn driver_dir(&self) -> Option<PathBuf> {
        self.driver_dir.clone()
    }
}

/// Script runner that replays exit codes and records each script's lines.
///
/// Once the queued codes run out every further script exits with 0.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    codes: Mutex<VecDeque<i32>>,
    scripts: Mutex<Vec<String>>,
    fail_spawn: bool,
}

impl ScriptedRunner {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        ScriptedRunner {
            codes: Mutex::new(codes.into_iter().collect()),
            ..Default::default()
        }
    }

    /// A runner whose scripts can never be started.
    pub fn failing_spawn() -> Self {
        ScriptedRunner {
            fail_spawn: true,
            ..Default::default()
        }
    }

    /// Lines of every script run so far, in order.
    pub fn scripts(&self) -> Vec<Vec<String>> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.lines().map(str::to_string).collect())
            .collect()
    }

    /// Exact file contents of every script run so far.
    pub fn raw_scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl ScriptRunner for ScriptedRunner {
    fn run(&self, _host: &HostPlatform, script: &Path, _dir: &Path) -> BuildResult<i32> {
        let content = fs::read_to_string(script)
            .map_err(|e| BuildError::io("failed to read script", script, e))?;
        self.scripts.lock().unwrap().push(content);

        if self.fail_spawn {
            return Err(BuildError::Spawn {
                command: script.display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "shell not found"),
            });
        }

        Ok(self.codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}

/// A shell that never colors and never pauses.
pub fn quiet_shell() -> Shell {
    Shell::new(ColorChoice::Never, PausePolicy::Never)
}
