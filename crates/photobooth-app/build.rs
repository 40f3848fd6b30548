use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let version_path = workspace_root(&manifest_dir).join("VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let raw_version = fs::read_to_string(&version_path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_path.display()));
    let version = raw_version.trim();
    assert!(
        is_release_version(version),
        "{} must hold MAJOR.MINOR.PATCH, found {version:?}",
        version_path.display()
    );

    println!("cargo:rustc-env=PHOTOBOOTH_VERSION={version}");
}

// crates/photobooth-app -> workspace root
fn workspace_root(manifest_dir: &Path) -> &Path {
    manifest_dir.ancestors().nth(2).expect("workspace root")
}

fn is_release_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()))
}
