//! Starter shader installation.
//!
//! The bundled sources are embedded in the binary so a bare `fragview`
//! invocation works from an empty directory; existing files are never
//! overwritten.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub const VERTEX_FILE: &str = "vertex.glsl";
pub const FRAGMENT_FILE: &str = "fragment.glsl";

const DEFAULT_VERTEX: &str = include_str!("../../../shaders/vertex.glsl");
const DEFAULT_FRAGMENT: &str = include_str!("../../../shaders/fragment.glsl");

/// Creates the shader directory if needed and installs any missing starter
/// file.
pub fn install_missing(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create shader directory {}", dir.display()))?;

    for (name, contents) in [
        (VERTEX_FILE, DEFAULT_VERTEX),
        (FRAGMENT_FILE, DEFAULT_FRAGMENT),
    ] {
        let target = dir.join(name);
        if target.exists() {
            continue;
        }
        fs::write(&target, contents)
            .with_context(|| format!("failed to install starter shader {}", target.display()))?;
        info!(path = %target.display(), "installed starter shader");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_starter_files_into_an_empty_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shaders = dir.path().join("shaders");

        install_missing(&shaders).expect("install");

        assert_eq!(
            fs::read_to_string(shaders.join(VERTEX_FILE)).expect("vertex"),
            DEFAULT_VERTEX
        );
        assert_eq!(
            fs::read_to_string(shaders.join(FRAGMENT_FILE)).expect("fragment"),
            DEFAULT_FRAGMENT
        );
    }

    #[test]
    fn never_overwrites_an_existing_shader() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fragment = dir.path().join(FRAGMENT_FILE);
        fs::write(&fragment, "// my edit").expect("seed");

        install_missing(dir.path()).expect("install");

        assert_eq!(
            fs::read_to_string(&fragment).expect("fragment"),
            "// my edit"
        );
        assert!(dir.path().join(VERTEX_FILE).exists());
    }
}
