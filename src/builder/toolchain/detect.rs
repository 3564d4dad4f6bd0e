//! Compiler version probes.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::builder::errors::{BuildError, BuildResult};
use crate::builder::host::Host;

use super::CompilerId;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid regex"));

/// Pull the first dotted version number out of tool output.
///
/// Accepts `11`, `11.4`, and `clang version 12.0.1 (...)` style output.
pub fn parse_version(output: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(output)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// `clang-cl` bundled with a VS install, relative to the `vcvarsall.bat` directory.
pub fn bundled_llvm_dir(compiler_root: &Path) -> PathBuf {
    compiler_root
        .join("..")
        .join("..")
        .join("Tools")
        .join("Llvm")
        .join("bin")
}

/// Determine the version number that goes into build directory names.
///
/// MSVC toolsets carry a fixed number; clang-cl, gcc and clang report their
/// major version.
pub fn compiler_version(
    host: &dyn Host,
    compiler: CompilerId,
    compiler_root: &Path,
) -> BuildResult<u32> {
    if let Some(toolset) = compiler.msvc_toolset() {
        return Ok(toolset);
    }

    let (program, args): (PathBuf, &[&str]) = match compiler {
        CompilerId::ClangCl => (bundled_llvm_dir(compiler_root).join("clang-cl.exe"), &["--version"]),
        CompilerId::Gcc => (PathBuf::from("gcc"), &["-dumpversion"]),
        CompilerId::Clang => (PathBuf::from("clang"), &["-dumpversion"]),
        CompilerId::Vc142 | CompilerId::Vc143 => unreachable!("msvc toolsets handled above"),
    };

    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let output = host
        .capture(&program, &args)
        .map_err(|e| BuildError::CompilerVersion {
            compiler: compiler.to_string(),
            reason: e.to_string(),
        })?;

    let version = parse_version(&output).ok_or_else(|| BuildError::CompilerVersion {
        compiler: compiler.to_string(),
        reason: format!("unrecognized version output `{}`", output.trim()),
    })?;

    tracing::debug!("{} version {}", compiler, version);

    u32::try_from(version.major).map_err(|_| BuildError::CompilerVersion {
        compiler: compiler.to_string(),
        reason: format!("version {} out of range", version),
    })
}
