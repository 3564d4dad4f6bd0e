//! Configure-then-build orchestration for one architecture.
//!
//! ## Phases
//!
//! 1. **Configure** - one script per build directory that prepares `PATH`,
//!    calls the environment-setup script (IDE projects) and runs `cmake`.
//!    A failing configure is retried twice before giving up.
//! 2. **Build** - one script that runs the native build driver for every
//!    configuration and target, stopping at the first failure.
//!
//! IDE generators are multi-config and share one build directory. Makefile
//! generators are single-config, so each configuration gets its own
//! directory (`<name>-<config>`) and its own configure run. With a fixed
//! `BUILD_DIR` they share one directory and are configured and built in turn.
//!
//! Scripts run with the build directory as the child's working directory;
//! the driver's own working directory is never changed.

use std::path::{Path, PathBuf};

use crate::builder::batch::{BatchCommand, ScriptRunner};
use crate::builder::compiler::CompilerInfo;
use crate::builder::errors::{BuildError, BuildResult};
use crate::builder::info::BuildInfo;
use crate::builder::toolchain::{bundled_llvm_dir, vs_arch_options, CompilerId, ProjectKind};
use crate::util::fs::{absolute, ensure_dir};
use crate::util::process::find_cmake;
use crate::util::shell::Shell;

/// Total configure attempts before the failure becomes fatal.
pub const CONFIGURE_ATTEMPTS: u32 = 3;

/// Target name that builds everything.
pub const ALL_BUILD: &str = "ALL_BUILD";

/// One configured build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureUnit {
    /// Absolute build directory
    pub dir: PathBuf,
    /// Configuration baked in at configure time (single-config generators only)
    pub config: Option<String>,
}

/// Configure and build the projects of one source tree for one architecture.
pub struct BuildProjects<'a> {
    name: String,
    source_dir: PathBuf,
    info: &'a BuildInfo,
    compiler: &'a CompilerInfo,
    targets: Vec<String>,
    cmake_args: Vec<String>,
}

impl<'a> BuildProjects<'a> {
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        info: &'a BuildInfo,
        compiler: &'a CompilerInfo,
    ) -> Self {
        BuildProjects {
            name: name.into(),
            source_dir: source_dir.into(),
            info,
            compiler,
            targets: Vec::new(),
            cmake_args: Vec::new(),
        }
    }

    /// Specify targets to build.
    pub fn targets(mut self, targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Add configure-tool arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cmake_args.extend(args.into_iter().map(Into::into));
        self
    }

    fn project(&self) -> ProjectKind {
        self.info.project()
    }

    fn is_windows(&self) -> bool {
        self.info.host_platform().is_windows()
    }

    fn target_list(&self) -> Vec<String> {
        if self.targets.is_empty() {
            vec![ALL_BUILD.to_string()]
        } else {
            self.targets.clone()
        }
    }

    /// Build directories to configure, in order.
    pub fn units(&self) -> BuildResult<Vec<ConfigureUnit>> {
        let build_root = absolute(&self.source_dir)?.join("Build");
        let arch = &self.compiler.arch;

        if self.project().is_ide() {
            return Ok(vec![ConfigureUnit {
                dir: build_root.join(self.info.build_dir_name(arch, None)),
                config: None,
            }]);
        }

        Ok(self
            .info
            .configs()
            .iter()
            .map(|config| ConfigureUnit {
                dir: build_root.join(self.info.build_dir_name(arch, Some(config))),
                config: Some(config.clone()),
            })
            .collect())
    }

    fn path_line(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(dir) = self.info.driver_dir() {
            parts.push(dir.display().to_string());
        }
        if self.compiler.has_root() {
            parts.push(self.compiler.compiler_root.display().to_string());
        }
        if parts.is_empty() {
            return None;
        }

        Some(if self.is_windows() {
            format!("@SET PATH={};%PATH%", parts.join(";"))
        } else {
            format!("export PATH={}:$PATH", parts.join(":"))
        })
    }

    fn cd_line(&self, dir: &Path) -> String {
        if self.is_windows() {
            format!("@CD /d \"{}\"", dir.display())
        } else {
            format!("cd \"{}\" || exit 1", dir.display())
        }
    }

    fn exit_check(&self) -> &'static str {
        if self.is_windows() {
            "@if ERRORLEVEL 1 exit /B 1"
        } else {
            "if [ $? -ne 0 ]; then exit 1; fi"
        }
    }

    /// `@CALL "<vcvarsall>" <arch option>` for IDE projects.
    fn setup_line(&self) -> BuildResult<Option<String>> {
        if !self.project().is_ide() {
            return Ok(None);
        }
        let Some(script) = self.compiler.setup_script() else {
            return Ok(None);
        };
        let vs = vs_arch_options(self.project(), &self.compiler.arch, self.info.host_arch())?;
        Ok(Some(format!(
            "@CALL \"{}\" {}",
            script.display(),
            self.compiler.setup_args(vs.setup_arg)
        )))
    }

    /// The configure script for one build directory.
    pub fn configure_batch(&self, unit: &ConfigureUnit) -> BuildResult<BatchCommand> {
        let mut batch = BatchCommand::new(self.info.host_platform().clone());

        if let Some(line) = self.path_line() {
            batch.add(line);
        }
        if let Some(line) = self.setup_line()? {
            batch.add(line);
            batch.add(self.cd_line(&unit.dir));
        }

        let mut cmd = format!("cmake -G \"{}\"", self.compiler.generator);
        if self.project().is_ide() {
            if let Some(toolset) = self.info.compiler().toolset_arg() {
                cmd.push(' ');
                cmd.push_str(&toolset);
            }
        }
        for arg in &self.cmake_args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        if self.project().is_ide() {
            let vs = vs_arch_options(self.project(), &self.compiler.arch, self.info.host_arch())?;
            cmd.push_str(&format!(" -A {}", vs.platform));
            if self.info.compiler() == CompilerId::ClangCl {
                let llvm = bundled_llvm_dir(&self.compiler.compiler_root);
                cmd.push_str(&format!(" -DClangCL_Path=\"{}/\"", llvm.display()));
            }
        }
        if let Some(ref config) = unit.config {
            cmd.push_str(&format!(" -DCMAKE_BUILD_TYPE={}", config));
        }
        cmd.push_str(" ../../");
        batch.add(cmd);

        Ok(batch)
    }

    /// The build script covering every configuration and target.
    pub fn build_batch(&self, units: &[ConfigureUnit]) -> BuildResult<BatchCommand> {
        let mut batch = BatchCommand::new(self.info.host_platform().clone());
        let jobs = self.info.jobs();
        let targets = self.target_list();

        if self.project().is_ide() {
            let vs = vs_arch_options(self.project(), &self.compiler.arch, self.info.host_arch())?;
            let vs_version = self.project().vs_version().unwrap_or_default();

            if let Some(line) = self.setup_line()? {
                batch.add(line);
            }
            if let Some(unit) = units.first() {
                batch.add(self.cd_line(&unit.dir));
            }

            for config in self.info.configs() {
                for target in &targets {
                    let file = if target.is_empty() {
                        format!("{}.sln", self.name)
                    } else {
                        format!("{}.vcxproj", target)
                    };
                    batch.add(format!("@SET VisualStudioVersion={}.0", vs_version));
                    batch.add(format!(
                        "@MSBuild {} /nologo /m:{} /v:m /p:Configuration={},Platform={}",
                        file, jobs, config, vs.platform
                    ));
                    batch.add(self.exit_check());
                }
            }
        } else {
            let make = ProjectKind::make_program(self.info.host_platform());
            let prefix = if self.is_windows() { "@" } else { "" };

            for unit in units {
                batch.add(self.cd_line(&unit.dir));
                for target in &targets {
                    let mut cmd = format!("{}{} -j{}", prefix, make, jobs);
                    if target != ALL_BUILD && !target.is_empty() {
                        cmd.push(' ');
                        cmd.push_str(target);
                    }
                    batch.add(cmd);
                    batch.add(self.exit_check());
                }
            }
        }

        Ok(batch)
    }

    fn configure(
        &self,
        unit: &ConfigureUnit,
        shell: &Shell,
        runner: &dyn ScriptRunner,
    ) -> BuildResult<()> {
        let batch = self.configure_batch(unit)?;

        for attempt in 1..=CONFIGURE_ATTEMPTS {
            let code = batch.execute(&unit.dir, runner)?;
            if code == 0 {
                return Ok(());
            }
            tracing::debug!("configure attempt {} exited with {}", attempt, code);
            if attempt < CONFIGURE_ATTEMPTS {
                shell.warn(format!("Config {} failed, retry {}...", self.name, attempt));
            }
        }

        Err(BuildError::ConfigureFailed {
            name: self.name.clone(),
            attempts: CONFIGURE_ATTEMPTS,
        })
    }

    /// Configure every build directory, then build every configuration and target.
    ///
    /// When several configurations share one single-config directory (a
    /// fixed `BUILD_DIR`), each is configured and built before the next one
    /// reconfigures the tree.
    pub fn run(&self, shell: &Shell, runner: &dyn ScriptRunner) -> BuildResult<()> {
        let units = self.units()?;
        let shared_dir = units.iter().skip(1).any(|u| u.dir == units[0].dir);

        shell.print(format!("Building {}...", self.name));

        if !self.project().is_ide() && find_cmake().is_none() {
            tracing::warn!("cmake not found in PATH");
        }

        for unit in &units {
            ensure_dir(&unit.dir)?;
        }

        if shared_dir {
            tracing::debug!(
                "configurations share {}, building one at a time",
                units[0].dir.display()
            );
            for unit in &units {
                self.configure(unit, shell, runner)?;
                self.build(std::slice::from_ref(unit), runner)?;
            }
        } else {
            for unit in &units {
                self.configure(unit, shell, runner)?;
            }
            self.build(&units, runner)?;
        }

        shell.print("");
        Ok(())
    }

    fn build(&self, units: &[ConfigureUnit], runner: &dyn ScriptRunner) -> BuildResult<()> {
        let Some(first) = units.first() else {
            return Ok(());
        };
        let batch = self.build_batch(units)?;
        let code = batch.execute(&first.dir, runner)?;
        if code != 0 {
            return Err(BuildError::BuildFailed {
                name: self.name.clone(),
                exit_code: code,
            });
        }
        Ok(())
    }
}

/// Configure and build `targets` of the tree at `source_dir` for one architecture.
#[allow(clippy::too_many_arguments)]
pub fn build_projects(
    name: &str,
    source_dir: &Path,
    info: &BuildInfo,
    compiler: &CompilerInfo,
    targets: &[String],
    cmake_args: &[String],
    shell: &Shell,
    runner: &dyn ScriptRunner,
) -> BuildResult<()> {
    BuildProjects::new(name, source_dir, info, compiler)
        .targets(targets.iter().cloned())
        .args(cmake_args.iter().cloned())
        .run(shell, runner)
}
