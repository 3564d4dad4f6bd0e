//! Visual Studio installation discovery.

use std::path::{Path, PathBuf};

use crate::builder::errors::{BuildError, BuildResult};
use crate::builder::host::Host;

use super::ProjectKind;

/// Environment-setup script shipped with every VS 2017+ C++ install.
pub const VCVARSALL: &str = "vcvarsall.bat";

/// Installer component id that marks a VS install with native C++ tools.
pub const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";

const EDITIONS: [&str; 4] = ["Community", "Professional", "Enterprise", "BuildTools"];

/// Root under which Visual Studio installs itself.
///
/// A 64-bit driver looks under `ProgramFiles(x86)`, a 32-bit one under
/// `ProgramFiles`.
pub fn program_files_folder(host: &dyn Host) -> PathBuf {
    let (var, fallback) = if host.is_64bit() {
        ("ProgramFiles(x86)", "C:\\Program Files (x86)")
    } else {
        ("ProgramFiles", "C:\\Program Files")
    };
    PathBuf::from(host.env_var(var).unwrap_or_else(|| fallback.to_string()))
}

/// Fixed location of the installer's locator tool.
pub fn vswhere_path(program_files: &Path) -> PathBuf {
    program_files
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe")
}

/// Arguments asking the locator for the newest matching install path.
pub fn vswhere_args(vs_version: u32, allow_prerelease: bool) -> Vec<String> {
    let mut args: Vec<String> = [
        "-products",
        "*",
        "-latest",
        "-requires",
        VC_TOOLS_COMPONENT,
        "-property",
        "installationPath",
        "-version",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(format!("[{}.0,{}.0)", vs_version, vs_version + 1));
    if allow_prerelease {
        args.push("-prerelease".to_string());
    }
    args
}

fn vcvars_dir(install: &Path) -> PathBuf {
    install.join("VC").join("Auxiliary").join("Build")
}

/// Find the directory holding `vcvarsall.bat` for the given VS release.
///
/// Prefers the installer's locator tool; without it, scans the well-known
/// `{channel}\{edition}` install directories.
pub fn find_vs_folder(
    host: &dyn Host,
    program_files: &Path,
    project: ProjectKind,
    allow_prerelease: bool,
) -> Option<PathBuf> {
    let (version, year) = project.vs_version().zip(project.vs_year())?;

    let vswhere = vswhere_path(program_files);
    if host.exists(&vswhere) {
        tracing::debug!("Found vswhere at: {}", vswhere.display());

        let output = match host.capture(&vswhere, &vswhere_args(version, allow_prerelease)) {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!("vswhere failed: {}", e);
                return None;
            }
        };

        let install = output.lines().map(str::trim).find(|l| !l.is_empty())?;
        let folder = vcvars_dir(Path::new(install));
        if host.exists(&folder.join(VCVARSALL)) {
            return Some(folder);
        }
        tracing::debug!("{} not found under {}", VCVARSALL, folder.display());
        return None;
    }

    tracing::debug!("vswhere.exe not found, scanning install directories");

    let mut channels = Vec::with_capacity(2);
    if allow_prerelease {
        channels.push("Preview");
    }
    channels.push(year);

    for channel in channels {
        for edition in EDITIONS {
            let folder = vcvars_dir(
                &program_files
                    .join("Microsoft Visual Studio")
                    .join(channel)
                    .join(edition),
            );
            if host.exists(&folder.join(VCVARSALL)) {
                return Some(folder);
            }
        }
    }

    None
}

/// Per-architecture options for IDE projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsArchOptions {
    /// Argument for `vcvarsall.bat`
    pub setup_arg: &'static str,
    /// CMake `-A` value and MSBuild `Platform`
    pub platform: &'static str,
}

/// Map a target architecture to `vcvarsall.bat` and CMake/MSBuild platform names.
pub fn vs_arch_options(
    project: ProjectKind,
    arch: &str,
    host_arch: &str,
) -> BuildResult<VsArchOptions> {
    match (arch, host_arch) {
        ("x64", _) => Ok(VsArchOptions {
            setup_arg: "amd64",
            platform: "x64",
        }),
        ("arm64", "arm64") => Ok(VsArchOptions {
            setup_arg: "arm64",
            platform: "ARM64",
        }),
        ("arm64", _) => Ok(VsArchOptions {
            setup_arg: "amd64_arm64",
            platform: "ARM64",
        }),
        (other, _) => Err(BuildError::UnsupportedArch {
            project: project.as_str().to_string(),
            arch: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeHost;

    fn pf() -> PathBuf {
        PathBuf::from("C:\\Program Files (x86)")
    }

    #[test]
    fn test_program_files_folder() {
        let host = FakeHost::windows();
        assert_eq!(program_files_folder(&host), pf());

        let host = FakeHost::windows().with_env("ProgramFiles(x86)", "D:\\PF86");
        assert_eq!(program_files_folder(&host), PathBuf::from("D:\\PF86"));

        let host = FakeHost::windows()
            .with_32bit_driver()
            .with_env("ProgramFiles", "E:\\PF");
        assert_eq!(program_files_folder(&host), PathBuf::from("E:\\PF"));
    }

    #[test]
    fn test_vswhere_args() {
        let args = vswhere_args(16, false);
        assert!(args.contains(&"[16.0,17.0)".to_string()));
        assert!(args.contains(&VC_TOOLS_COMPONENT.to_string()));
        assert!(!args.contains(&"-prerelease".to_string()));

        assert!(vswhere_args(17, true).ends_with(&["-prerelease".to_string()]));
    }

    #[test]
    fn test_find_via_vswhere() {
        let install = PathBuf::from("C:\\VS\\2019\\Community");
        let host = FakeHost::windows()
            .with_file(vswhere_path(&pf()))
            .with_capture("vswhere.exe", format!("{}\r\n", install.display()))
            .with_file(vcvars_dir(&install).join(VCVARSALL));

        let found = find_vs_folder(&host, &pf(), ProjectKind::Vs2019, false).unwrap();
        assert_eq!(found, vcvars_dir(&install));
    }

    #[test]
    fn test_vswhere_hit_without_vcvarsall_is_rejected() {
        let host = FakeHost::windows()
            .with_file(vswhere_path(&pf()))
            .with_capture("vswhere.exe", "C:\\VS\\2019\\Community\r\n");

        assert!(find_vs_folder(&host, &pf(), ProjectKind::Vs2019, false).is_none());
    }

    #[test]
    fn test_vswhere_empty_output() {
        let host = FakeHost::windows()
            .with_file(vswhere_path(&pf()))
            .with_capture("vswhere.exe", "\r\n");

        assert!(find_vs_folder(&host, &pf(), ProjectKind::Vs2019, false).is_none());
    }

    #[test]
    fn test_fallback_scan_picks_first_edition() {
        let base = pf().join("Microsoft Visual Studio").join("2019");
        let host = FakeHost::windows()
            .with_file(vcvars_dir(&base.join("Enterprise")).join(VCVARSALL))
            .with_file(vcvars_dir(&base.join("BuildTools")).join(VCVARSALL));

        let found = find_vs_folder(&host, &pf(), ProjectKind::Vs2019, false).unwrap();
        assert_eq!(found, vcvars_dir(&base.join("Enterprise")));
    }

    #[test]
    fn test_fallback_scan_preview_only_when_allowed() {
        let preview = pf()
            .join("Microsoft Visual Studio")
            .join("Preview")
            .join("Community");
        let host = FakeHost::windows().with_file(vcvars_dir(&preview).join(VCVARSALL));

        assert!(find_vs_folder(&host, &pf(), ProjectKind::Vs2019, false).is_none());
        assert_eq!(
            find_vs_folder(&host, &pf(), ProjectKind::Vs2019, true).unwrap(),
            vcvars_dir(&preview)
        );
    }

    #[test]
    fn test_make_has_no_vs_folder() {
        let host = FakeHost::windows();
        assert!(find_vs_folder(&host, &pf(), ProjectKind::Make, true).is_none());
    }

    #[test]
    fn test_vs_arch_options() {
        let x64 = vs_arch_options(ProjectKind::Vs2019, "x64", "x64").unwrap();
        assert_eq!(x64.setup_arg, "amd64");
        assert_eq!(x64.platform, "x64");

        let cross = vs_arch_options(ProjectKind::Vs2019, "arm64", "x64").unwrap();
        assert_eq!(cross.setup_arg, "amd64_arm64");
        assert_eq!(cross.platform, "ARM64");

        let native = vs_arch_options(ProjectKind::Vs2022, "arm64", "arm64").unwrap();
        assert_eq!(native.setup_arg, "arm64");

        assert!(matches!(
            vs_arch_options(ProjectKind::Vs2019, "x86", "x64"),
            Err(BuildError::UnsupportedArch { .. })
        ));
    }
}
