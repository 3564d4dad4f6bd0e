//! Build driver error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised while resolving the toolchain or driving a build.
///
/// Every variant is fatal for the process. The binary's top-level handler
/// prints it with an `[E]` prefix and exits with status 1.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unknown host architecture {arch}.")]
    UnknownHostArch { arch: String },

    #[error("Unsupported target platform {platform}.")]
    UnsupportedTargetPlatform { platform: String },

    #[error("Could NOT find a Visual Studio installation with C++ tools; pass a project kind explicitly.")]
    NoDefaultToolchain,

    #[error("Could NOT find {compiler} compiler toolset for {ide}.")]
    ToolchainNotFound { compiler: String, ide: String },

    #[error("Could NOT determine the version of {compiler}: {reason}")]
    CompilerVersion { compiler: String, reason: String },

    #[error("Unsupported project type {project}.")]
    UnsupportedProject { project: String },

    #[error("Unsupported compiler {compiler}.")]
    UnsupportedCompiler { compiler: String },

    #[error("Wrong combination of project {project} and compiler {compiler}.")]
    WrongCombination { project: String, compiler: String },

    #[error("Unsupported {project} architecture {arch}.")]
    UnsupportedArch { project: String, arch: String },

    #[error("Config {name} failed.")]
    ConfigureFailed { name: String, attempts: u32 },

    #[error("Build {name} failed.")]
    BuildFailed { name: String, exit_code: i32 },

    #[error("`{command}` exited with {status}: {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{action} `{}`: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
