//! Per-architecture compiler description.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Script that prepares a shell for the compiler (e.g. `vcvarsall.bat`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvSetup {
    /// Script file name, relative to the compiler root
    pub script: String,
    /// Extra arguments appended after the architecture option
    pub options: String,
}

/// One compiler/architecture pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerInfo {
    /// Target architecture (`x64`, `arm64`)
    pub arch: String,
    /// CMake generator name
    pub generator: String,
    /// Directory holding the environment-setup script; empty for compilers found on PATH
    pub compiler_root: PathBuf,
    /// Environment-setup script, for IDE projects
    pub setup: Option<EnvSetup>,
}

impl CompilerInfo {
    pub fn new(
        arch: impl Into<String>,
        generator: impl Into<String>,
        compiler_root: impl Into<PathBuf>,
        setup: Option<EnvSetup>,
    ) -> Self {
        CompilerInfo {
            arch: arch.into(),
            generator: generator.into(),
            compiler_root: compiler_root.into(),
            setup,
        }
    }

    /// Whether the compiler root is known.
    pub fn has_root(&self) -> bool {
        !self.compiler_root.as_os_str().is_empty()
    }

    /// Full path of the environment-setup script.
    pub fn setup_script(&self) -> Option<PathBuf> {
        self.setup
            .as_ref()
            .map(|s| self.compiler_root.join(Path::new(&s.script)))
    }

    /// Arguments for the environment-setup script: the architecture option
    /// followed by any configured extras.
    pub fn setup_args(&self, arch_option: &str) -> String {
        match &self.setup {
            Some(s) if !s.options.is_empty() => format!("{} {}", arch_option, s.options),
            _ => arch_option.to_string(),
        }
    }
}
