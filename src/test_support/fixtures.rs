//! Canned Visual Studio installs.

use std::path::PathBuf;

use crate::builder::toolchain::{vswhere_path, VCVARSALL};

use super::FakeHost;

/// Install root used for a fake VS release.
pub fn vs_install_dir(year: &str) -> PathBuf {
    PathBuf::from("C:\\VS").join(year).join("Community")
}

/// Directory resolution reports as the compiler root for a fake VS release.
pub fn vs_root(year: &str) -> PathBuf {
    vs_install_dir(year).join("VC").join("Auxiliary").join("Build")
}

/// Make `host` look like it has the given VS release installed and
/// registered with the installer's locator tool.
pub fn vs_install(host: FakeHost, year: &str) -> FakeHost {
    let version = match year {
        "2022" => 17,
        _ => 16,
    };
    let program_files = PathBuf::from("C:\\Program Files (x86)");

    host.with_file(vswhere_path(&program_files))
        .with_capture(
            format!("[{}.0,{}.0)", version, version + 1),
            format!("{}\r\n", vs_install_dir(year).display()),
        )
        .with_file(vs_root(year).join(VCVARSALL))
}
