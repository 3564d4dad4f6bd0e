//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.gsbuild/config.toml` - user-wide defaults
//! - Project: `<source>/.gsbuild/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! arguments take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Build driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Project kind (`vs2019`, `vs2022`, `make`)
    pub project: Option<String>,

    /// Compiler id (`vc142`, `vc143`, `clangcl`, `gcc`, `clang`)
    pub compiler: Option<String>,

    /// Target architectures
    pub archs: Option<Vec<String>>,

    /// Build configurations, in build order
    pub configs: Option<Vec<String>>,

    /// Parallel job count
    pub jobs: Option<usize>,

    /// Build targets
    pub targets: Option<Vec<String>>,

    /// Extra options for the configure tool
    #[serde(default)]
    pub cmake_args: Vec<String>,

    /// Extra options for the environment-setup script
    pub setup_options: Option<String>,

    /// Accept prerelease Visual Studio installations
    pub allow_prerelease: Option<bool>,

    /// Wait for Enter after a fatal error
    pub pause: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let b = other.build;
        if b.project.is_some() {
            self.build.project = b.project;
        }
        if b.compiler.is_some() {
            self.build.compiler = b.compiler;
        }
        if b.archs.is_some() {
            self.build.archs = b.archs;
        }
        if b.configs.is_some() {
            self.build.configs = b.configs;
        }
        if b.jobs.is_some() {
            self.build.jobs = b.jobs;
        }
        if b.targets.is_some() {
            self.build.targets = b.targets;
        }
        if !b.cmake_args.is_empty() {
            self.build.cmake_args = b.cmake_args;
        }
        if b.setup_options.is_some() {
            self.build.setup_options = b.setup_options;
        }
        if b.allow_prerelease.is_some() {
            self.build.allow_prerelease = b.allow_prerelease;
        }
        if b.pause.is_some() {
            self.build.pause = b.pause;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`.gsbuild/config.toml`)
/// 2. Global config (`~/.gsbuild/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (`~/.gsbuild`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".gsbuild"))
}

/// Get the global config path (`~/.gsbuild/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`<source>/.gsbuild/config.toml`).
pub fn project_config_path(source_root: &Path) -> PathBuf {
    source_root.join(".gsbuild").join("config.toml")
}
