//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::errors::{BuildError, BuildResult};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> BuildResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| BuildError::io("failed to create directory", path, e))?;
    }
    Ok(())
}

/// Resolve `path` against the current directory without touching the filesystem.
pub fn absolute(path: &Path) -> BuildResult<PathBuf> {
    std::path::absolute(path).map_err(|e| BuildError::io("failed to resolve path", path, e))
}

/// Write a script file with one line per command, each ended by `line_ending`.
pub fn write_lines(path: &Path, lines: &[String], line_ending: &str) -> BuildResult<()> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push_str(line_ending);
    }
    fs::write(path, contents).map_err(|e| BuildError::io("failed to write file", path, e))
}

/// Mark a file as executable by everyone.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> BuildResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        .map_err(|e| BuildError::io("failed to set permissions on", path, e))
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> BuildResult<()> {
    Ok(())
}
