//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use gsbuild::builder::info::split_list;
use gsbuild::ops::ALL_BUILD;
use gsbuild::util::config::BuildConfig;
use gsbuild::util::shell::ColorChoice;
use gsbuild::BuildRequest;

/// Configure and build the GoldenSun CMake projects
#[derive(Parser, Debug)]
#[command(name = "gsbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project kind: vs2019, vs2022 or make
    pub project: Option<String>,

    /// Compiler: vc142, vc143, clangcl, gcc or clang
    pub compiler: Option<String>,

    /// Target architectures, comma separated (x64, arm64)
    pub arch: Option<String>,

    /// Build configurations, comma separated (Debug, Release, ...)
    pub config: Option<String>,

    /// Directory holding the top-level CMakeLists.txt
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Display name used in messages and for the solution file
    #[arg(long, default_value = "GoldenSun")]
    pub name: String,

    /// Target to build (repeatable)
    #[arg(long = "target", value_name = "NAME")]
    pub targets: Vec<String>,

    /// Extra argument passed to cmake at configure time (repeatable)
    #[arg(long = "cmake-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub cmake_args: Vec<String>,

    /// Number of parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extra arguments for the environment-setup script
    #[arg(long, value_name = "OPTIONS", allow_hyphen_values = true)]
    pub setup_options: Option<String>,

    /// Accept prerelease Visual Studio installations
    #[arg(long)]
    pub prerelease: bool,

    /// Never wait for Enter after a fatal error
    #[arg(long)]
    pub no_pause: bool,

    /// Print the resolved build information as JSON
    #[arg(long)]
    pub json: bool,

    /// Resolve and print the build information without building
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Merge the command line over the config file into a resolution request.
    pub fn build_request(&self, config: &BuildConfig) -> BuildRequest {
        BuildRequest {
            project: self.project.clone().or_else(|| config.project.clone()),
            compiler: self.compiler.clone().or_else(|| config.compiler.clone()),
            archs: self
                .arch
                .as_deref()
                .map(split_list)
                .or_else(|| config.archs.clone()),
            configs: self
                .config
                .as_deref()
                .map(split_list)
                .or_else(|| config.configs.clone()),
            jobs: self.jobs.or(config.jobs),
            setup_options: self
                .setup_options
                .clone()
                .or_else(|| config.setup_options.clone())
                .unwrap_or_default(),
            allow_prerelease: self.prerelease || config.allow_prerelease.unwrap_or(false),
        }
    }

    /// Targets to build: command line, then config, then `ALL_BUILD`.
    pub fn targets(&self, config: &BuildConfig) -> Vec<String> {
        if !self.targets.is_empty() {
            return self.targets.clone();
        }
        match config.targets {
            Some(ref targets) if !targets.is_empty() => targets.clone(),
            _ => vec![ALL_BUILD.to_string()],
        }
    }

    /// Configure arguments: config file first, command line appended.
    pub fn cmake_args(&self, config: &BuildConfig) -> Vec<String> {
        config
            .cmake_args
            .iter()
            .chain(self.cmake_args.iter())
            .cloned()
            .collect()
    }
}
