//! High-level operations.
//!
//! This module contains the implementation of the `gsbuild` command.

pub mod build_projects;

pub use build_projects::{
    build_projects, BuildProjects, ConfigureUnit, ALL_BUILD, CONFIGURE_ATTEMPTS,
};
