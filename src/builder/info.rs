//! Build environment resolution.
//!
//! [`BuildInfo::resolve`] turns a [`BuildRequest`] (everything the user may
//! leave unspecified) into a fully resolved configuration: project kind,
//! compiler, toolchain location, architectures, configurations and job count.
//! Once built, a `BuildInfo` never changes.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::compiler::{CompilerInfo, EnvSetup};
use crate::builder::errors::{BuildError, BuildResult};
use crate::builder::host::{normalize_arch, Host, HostPlatform};
use crate::builder::toolchain::{
    compiler_version, find_vs_folder, program_files_folder, vs_arch_options, CompilerId,
    ProjectKind, VCVARSALL,
};

/// Environment variable that replaces the computed build directory name.
pub const BUILD_DIR_ENV: &str = "BUILD_DIR";

/// Architectures built when none are requested.
pub const DEFAULT_ARCHS: &[&str] = &["x64"];

/// Configurations built when none are requested, in build order.
pub const DEFAULT_CONFIGS: &[&str] = &["Debug", "RelWithDebInfo"];

/// User-supplied overrides. Anything left `None` is resolved from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub project: Option<String>,
    pub compiler: Option<String>,
    pub archs: Option<Vec<String>>,
    pub configs: Option<Vec<String>>,
    pub jobs: Option<usize>,
    /// Extra arguments for the environment-setup script
    pub setup_options: String,
    /// Accept prerelease IDE installations
    pub allow_prerelease: bool,
}

impl BuildRequest {
    /// Build a request from the positional `[project] [compiler] [arch] [config]`
    /// arguments. `arch` and `config` may be comma-separated lists.
    pub fn from_positional(args: &[String]) -> Self {
        let arg = |i: usize| args.get(i).filter(|s| !s.is_empty()).cloned();
        BuildRequest {
            project: arg(0),
            compiler: arg(1),
            archs: arg(2).map(|s| split_list(&s)),
            configs: arg(3).map(|s| split_list(&s)),
            ..Default::default()
        }
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fully resolved build configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    host_platform: HostPlatform,
    host_arch: String,
    target_platform: HostPlatform,
    project: ProjectKind,
    compiler: CompilerId,
    compiler_name: String,
    compiler_version: u32,
    compilers: Vec<CompilerInfo>,
    configs: Vec<String>,
    jobs: usize,
    #[serde(skip)]
    driver_dir: Option<PathBuf>,
    #[serde(skip)]
    build_dir_override: Option<String>,
}

impl BuildInfo {
    /// Resolve a request against the host.
    pub fn resolve(request: &BuildRequest, host: &dyn Host) -> BuildResult<Self> {
        let host_platform = host.platform();
        let target_platform = host_platform.clone();
        let host_arch = normalize_arch(&host.machine())?.to_string();
        let is_windows = target_platform.is_windows();

        let project = request
            .project
            .as_deref()
            .map(str::parse::<ProjectKind>)
            .transpose()?;
        let compiler = request
            .compiler
            .as_deref()
            .map(str::parse::<CompilerId>)
            .transpose()?;

        let program_files = program_files_folder(host);
        let mut located = None;

        let (project, compiler) = match (project, compiler) {
            (Some(p), Some(c)) => (p, c),
            (Some(p), None) => (p, p.default_compiler()),
            (None, Some(c)) => (c.default_project(), c),
            (None, None) => {
                if !is_windows {
                    return Err(BuildError::UnsupportedTargetPlatform {
                        platform: target_platform.to_string(),
                    });
                }
                let (kind, folder) = [ProjectKind::Vs2019, ProjectKind::Vs2022]
                    .into_iter()
                    .find_map(|kind| {
                        find_vs_folder(host, &program_files, kind, request.allow_prerelease)
                            .map(|folder| (kind, folder))
                    })
                    .ok_or(BuildError::NoDefaultToolchain)?;
                located = Some(folder);
                (kind, kind.default_compiler())
            }
        };

        if !compiler.supports(project) {
            return Err(BuildError::WrongCombination {
                project: project.to_string(),
                compiler: compiler.to_string(),
            });
        }

        let (compiler_root, setup) = if project.is_ide() {
            let folder = match located {
                Some(folder) => Some(folder),
                None if is_windows => {
                    find_vs_folder(host, &program_files, project, request.allow_prerelease)
                }
                None => None,
            };
            let folder = folder.ok_or_else(|| BuildError::ToolchainNotFound {
                compiler: compiler.to_string(),
                ide: project.ide_label(),
            })?;
            tracing::debug!("Using {} from {}", project.ide_label(), folder.display());

            let setup = EnvSetup {
                script: VCVARSALL.to_string(),
                options: request.setup_options.clone(),
            };
            (folder, Some(setup))
        } else {
            (PathBuf::new(), None)
        };

        let archs = non_empty_or(&request.archs, DEFAULT_ARCHS);
        let configs = non_empty_or(&request.configs, DEFAULT_CONFIGS);

        for arch in &archs {
            if project.is_ide() {
                vs_arch_options(project, arch, &host_arch)?;
            } else if *arch != host_arch {
                return Err(BuildError::UnsupportedArch {
                    project: project.to_string(),
                    arch: arch.clone(),
                });
            }
        }

        let compiler_version = compiler_version(host, compiler, &compiler_root)?;

        let generator = project.generator(&host_platform);
        let compilers = archs
            .iter()
            .map(|arch| CompilerInfo::new(arch, generator, compiler_root.clone(), setup.clone()))
            .collect();

        let jobs = request
            .jobs
            .filter(|&j| j > 0)
            .unwrap_or_else(|| host.cpu_count());

        Ok(BuildInfo {
            host_platform,
            host_arch,
            target_platform,
            project,
            compiler,
            compiler_name: compiler.family().to_string(),
            compiler_version,
            compilers,
            configs,
            jobs,
            driver_dir: host.driver_dir(),
            build_dir_override: host.env_var(BUILD_DIR_ENV).filter(|v| !v.is_empty()),
        })
    }

    pub fn host_platform(&self) -> &HostPlatform {
        &self.host_platform
    }

    pub fn host_arch(&self) -> &str {
        &self.host_arch
    }

    pub fn target_platform(&self) -> &HostPlatform {
        &self.target_platform
    }

    pub fn project(&self) -> ProjectKind {
        self.project
    }

    pub fn compiler(&self) -> CompilerId {
        self.compiler
    }

    pub fn compiler_name(&self) -> &str {
        &self.compiler_name
    }

    pub fn compiler_version(&self) -> u32 {
        self.compiler_version
    }

    /// One entry per requested architecture.
    pub fn compilers(&self) -> &[CompilerInfo] {
        &self.compilers
    }

    /// Build configurations, in build order.
    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Directory of the driver executable, prepended to `PATH` for child scripts.
    pub fn driver_dir(&self) -> Option<&PathBuf> {
        self.driver_dir.as_ref()
    }

    /// Name of the build directory for an architecture (and, for
    /// single-config generators, a configuration).
    ///
    /// `BUILD_DIR` replaces the whole name when set.
    pub fn build_dir_name(&self, arch: &str, config: Option<&str>) -> String {
        if let Some(ref name) = self.build_dir_override {
            return name.clone();
        }

        let mut name = format!(
            "{}_{}{}_{}_{}",
            self.project,
            self.compiler_name,
            self.compiler_version,
            self.target_platform,
            arch
        );
        if let Some(config) = config {
            name.push('-');
            name.push_str(config);
        }
        name
    }

    /// Human-readable summary of every resolved field.
    pub fn summary(&self) -> String {
        let archs: Vec<&str> = self.compilers.iter().map(|c| c.arch.as_str()).collect();

        let mut out = String::from("Build information:\n");
        let _ = writeln!(out, "\tHost platform: {}", self.host_platform);
        let _ = writeln!(out, "\tHost architecture: {}", self.host_arch);
        let _ = writeln!(out, "\tTarget platform: {}", self.target_platform);
        let _ = writeln!(out, "\tCPU count: {}", self.jobs);
        let _ = writeln!(out, "\tProject type: {}", self.project);
        let _ = writeln!(out, "\tCompiler: {}{}", self.compiler_name, self.compiler_version);
        if let Some(root) = self.compilers.first().filter(|c| c.has_root()) {
            let _ = writeln!(out, "\tCompiler root: {}", root.compiler_root.display());
        }
        let _ = writeln!(out, "\tArchitectures: {}", archs.join(", "));
        let _ = writeln!(out, "\tConfigures: {}", self.configs.join(", "));
        out
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn non_empty_or(list: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    match list {
        Some(items) if !items.is_empty() => items.clone(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}
