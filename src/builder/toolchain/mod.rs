//! Project kinds and compiler identities.
//!
//! A build is driven by a (project kind, compiler) pair. The project kind
//! picks the CMake generator and the native build driver; the compiler picks
//! the toolset and the version that ends up in the build directory name.
//!
//! | project  | compilers          | generator            | build driver |
//! |----------|--------------------|----------------------|--------------|
//! | `vs2019` | `vc142`, `clangcl` | `Visual Studio 16`   | MSBuild      |
//! | `vs2022` | `vc143`, `clangcl` | `Visual Studio 17`   | MSBuild      |
//! | `make`   | `gcc`, `clang`     | `Unix Makefiles`     | make         |

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::builder::errors::BuildError;
use crate::builder::host::HostPlatform;

mod detect;
mod msvc;

pub use detect::{bundled_llvm_dir, compiler_version, parse_version};
pub use msvc::{
    find_vs_folder, program_files_folder, vs_arch_options, vswhere_args, vswhere_path,
    VsArchOptions, VCVARSALL, VC_TOOLS_COMPONENT,
};

/// The kind of native project CMake generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    Vs2019,
    Vs2022,
    Make,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Vs2019 => "vs2019",
            ProjectKind::Vs2022 => "vs2022",
            ProjectKind::Make => "make",
        }
    }

    /// Whether this kind is an IDE project driven through MSBuild.
    pub fn is_ide(&self) -> bool {
        self.vs_version().is_some()
    }

    /// Visual Studio major version.
    pub fn vs_version(&self) -> Option<u32> {
        match self {
            ProjectKind::Vs2019 => Some(16),
            ProjectKind::Vs2022 => Some(17),
            ProjectKind::Make => None,
        }
    }

    /// Visual Studio release year, as used in install directory names.
    pub fn vs_year(&self) -> Option<&'static str> {
        match self {
            ProjectKind::Vs2019 => Some("2019"),
            ProjectKind::Vs2022 => Some("2022"),
            ProjectKind::Make => None,
        }
    }

    /// `VS2019`-style label for messages.
    pub fn ide_label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Compiler used when only the project kind is given.
    pub fn default_compiler(&self) -> CompilerId {
        match self {
            ProjectKind::Vs2019 => CompilerId::Vc142,
            ProjectKind::Vs2022 => CompilerId::Vc143,
            ProjectKind::Make => CompilerId::Gcc,
        }
    }

    /// CMake generator name.
    pub fn generator(&self, host: &HostPlatform) -> &'static str {
        match self {
            ProjectKind::Vs2019 => "Visual Studio 16",
            ProjectKind::Vs2022 => "Visual Studio 17",
            ProjectKind::Make if host.is_windows() => "MinGW Makefiles",
            ProjectKind::Make => "Unix Makefiles",
        }
    }

    /// Name of the make program for makefile kinds.
    pub fn make_program(host: &HostPlatform) -> &'static str {
        if host.is_windows() {
            "mingw32-make"
        } else {
            "make"
        }
    }
}

impl FromStr for ProjectKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vs2019" => Ok(ProjectKind::Vs2019),
            "vs2022" => Ok(ProjectKind::Vs2022),
            "make" => Ok(ProjectKind::Make),
            other => Err(BuildError::UnsupportedProject {
                project: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProjectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Compiler selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerId {
    Vc142,
    Vc143,
    ClangCl,
    Gcc,
    Clang,
}

impl CompilerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerId::Vc142 => "vc142",
            CompilerId::Vc143 => "vc143",
            CompilerId::ClangCl => "clangcl",
            CompilerId::Gcc => "gcc",
            CompilerId::Clang => "clang",
        }
    }

    /// Project kind used when only the compiler is given.
    pub fn default_project(&self) -> ProjectKind {
        match self {
            CompilerId::Vc142 | CompilerId::ClangCl => ProjectKind::Vs2019,
            CompilerId::Vc143 => ProjectKind::Vs2022,
            CompilerId::Gcc | CompilerId::Clang => ProjectKind::Make,
        }
    }

    /// Whether this compiler can be driven through `project`.
    pub fn supports(&self, project: ProjectKind) -> bool {
        matches!(
            (self, project),
            (CompilerId::Vc142, ProjectKind::Vs2019)
                | (CompilerId::Vc143, ProjectKind::Vs2022)
                | (CompilerId::ClangCl, ProjectKind::Vs2019 | ProjectKind::Vs2022)
                | (CompilerId::Gcc | CompilerId::Clang, ProjectKind::Make)
        )
    }

    /// Name used in build directory names (`vc`, `clangcl`, `gcc`, `clang`).
    pub fn family(&self) -> &'static str {
        match self {
            CompilerId::Vc142 | CompilerId::Vc143 => "vc",
            CompilerId::ClangCl => "clangcl",
            CompilerId::Gcc => "gcc",
            CompilerId::Clang => "clang",
        }
    }

    /// Fixed toolset version for MSVC compilers.
    pub fn msvc_toolset(&self) -> Option<u32> {
        match self {
            CompilerId::Vc142 => Some(142),
            CompilerId::Vc143 => Some(143),
            _ => None,
        }
    }

    /// CMake `-T` argument for IDE projects.
    pub fn toolset_arg(&self) -> Option<String> {
        match self {
            CompilerId::ClangCl => Some("-T ClangCL".to_string()),
            other => other
                .msvc_toolset()
                .map(|v| format!("-T v{},host=x64", v)),
        }
    }
}

impl FromStr for CompilerId {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vc142" => Ok(CompilerId::Vc142),
            "vc143" => Ok(CompilerId::Vc143),
            "clangcl" => Ok(CompilerId::ClangCl),
            "gcc" => Ok(CompilerId::Gcc),
            "clang" => Ok(CompilerId::Clang),
            other => Err(BuildError::UnsupportedCompiler {
                compiler: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CompilerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_kind() {
        assert_eq!("vs2019".parse::<ProjectKind>().unwrap(), ProjectKind::Vs2019);
        assert_eq!("make".parse::<ProjectKind>().unwrap(), ProjectKind::Make);
        assert!(matches!(
            "xcode".parse::<ProjectKind>(),
            Err(BuildError::UnsupportedProject { .. })
        ));
    }

    #[test]
    fn test_default_mappings() {
        assert_eq!(ProjectKind::Vs2019.default_compiler(), CompilerId::Vc142);
        assert_eq!(ProjectKind::Vs2022.default_compiler(), CompilerId::Vc143);
        assert_eq!(CompilerId::Vc142.default_project(), ProjectKind::Vs2019);
        assert_eq!(CompilerId::ClangCl.default_project(), ProjectKind::Vs2019);
        assert_eq!(CompilerId::Clang.default_project(), ProjectKind::Make);
    }

    #[test]
    fn test_supported_combinations() {
        assert!(CompilerId::Vc142.supports(ProjectKind::Vs2019));
        assert!(!CompilerId::Vc142.supports(ProjectKind::Vs2022));
        assert!(CompilerId::ClangCl.supports(ProjectKind::Vs2022));
        assert!(!CompilerId::Gcc.supports(ProjectKind::Vs2019));
        assert!(!CompilerId::Vc143.supports(ProjectKind::Make));
    }

    #[test]
    fn test_toolset_arg() {
        assert_eq!(CompilerId::Vc142.toolset_arg().unwrap(), "-T v142,host=x64");
        assert_eq!(CompilerId::ClangCl.toolset_arg().unwrap(), "-T ClangCL");
        assert!(CompilerId::Gcc.toolset_arg().is_none());
    }

    #[test]
    fn test_generator_names() {
        assert_eq!(ProjectKind::Vs2019.generator(&HostPlatform::Windows), "Visual Studio 16");
        assert_eq!(ProjectKind::Make.generator(&HostPlatform::Linux), "Unix Makefiles");
        assert_eq!(ProjectKind::Make.generator(&HostPlatform::Windows), "MinGW Makefiles");
        assert_eq!(ProjectKind::Vs2019.ide_label(), "VS2019");
    }
}
