//! Shell script batches.
//!
//! A [`BatchCommand`] collects command lines, writes them to a script file
//! (`kge_build.bat` on Windows hosts, `kge_build.sh` elsewhere), runs it and
//! removes the file again. Removal is tied to a drop guard, so the script is
//! gone whether the child succeeds, fails, or could not be spawned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::builder::errors::BuildResult;
use crate::builder::host::HostPlatform;
use crate::util::fs::{make_executable, write_lines};
use crate::util::process::{exit_code, ProcessBuilder};

/// Base name of the generated script.
pub const SCRIPT_STEM: &str = "kge_build";

/// Runs a generated script and reports its exit code.
pub trait ScriptRunner {
    /// Run `script` (a file inside `dir`) with `dir` as the working directory.
    fn run(&self, host: &HostPlatform, script: &Path, dir: &Path) -> BuildResult<i32>;
}

/// Runs scripts through the host shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ScriptRunner for SystemRunner {
    fn run(&self, host: &HostPlatform, script: &Path, dir: &Path) -> BuildResult<i32> {
        let file_name = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let pb = if host.is_windows() {
            ProcessBuilder::new("cmd").arg("/C").arg(file_name)
        } else {
            ProcessBuilder::new("sh").arg("-c").arg(format!("./{}", file_name))
        };

        let status = pb.cwd(dir).status()?;
        Ok(exit_code(&status))
    }
}

/// Removes the script file when dropped.
struct ScriptFile {
    path: PathBuf,
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// An ordered list of shell command lines.
#[derive(Debug, Clone)]
pub struct BatchCommand {
    commands: Vec<String>,
    host: HostPlatform,
}

impl BatchCommand {
    pub fn new(host: HostPlatform) -> Self {
        BatchCommand {
            commands: Vec::new(),
            host,
        }
    }

    /// Append a command line.
    pub fn add(&mut self, cmd: impl Into<String>) -> &mut Self {
        self.commands.push(cmd.into());
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// `cmd.exe` scripts use CRLF line endings.
    pub fn line_ending(&self) -> &'static str {
        if self.host.is_windows() {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Script file name for this batch's host.
    pub fn script_name(&self) -> String {
        let ext = if self.host.is_windows() { "bat" } else { "sh" };
        format!("{}.{}", SCRIPT_STEM, ext)
    }

    /// Write the script into `dir`, run it there and return its exit code.
    pub fn execute(&self, dir: &Path, runner: &dyn ScriptRunner) -> BuildResult<i32> {
        let path = dir.join(self.script_name());

        let script = ScriptFile { path };
        write_lines(&script.path, &self.commands, self.line_ending())?;
        make_executable(&script.path)?;

        tracing::debug!("Running {} ({} lines)", script.path.display(), self.commands.len());
        runner.run(&self.host, &script.path, dir)
    }
}
