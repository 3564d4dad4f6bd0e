//! GoldenSun build driver
//!
//! This crate resolves a C++ build environment (IDE or makefile project,
//! compiler, toolchain location, architectures, configurations) and drives
//! CMake configure and native builds for it.

pub mod builder;
pub mod ops;
pub mod util;

/// Test doubles for the host and script-runner seams.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildError, BuildInfo, BuildRequest, CompilerInfo};
pub use ops::build_projects;
