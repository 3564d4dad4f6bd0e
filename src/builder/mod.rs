//! Build environment resolution and script execution.
//!
//! This module resolves what to build with ([`BuildInfo`]) and runs the
//! generated configure and build scripts ([`BatchCommand`]).

pub mod batch;
pub mod compiler;
pub mod errors;
pub mod host;
pub mod info;
pub mod toolchain;

pub use batch::{BatchCommand, ScriptRunner, SystemRunner};
pub use compiler::{CompilerInfo, EnvSetup};
pub use errors::{BuildError, BuildResult};
pub use host::{Host, HostPlatform, SystemHost};
pub use info::{BuildInfo, BuildRequest};
pub use toolchain::{CompilerId, ProjectKind};
