// src/launch/java.rs

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{DevloopError, Result};

fn java_binary_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

/// Locate the `java` executable.
///
/// Order: the explicitly configured path, `$JAVA_HOME/bin/java`, then the
/// first match on `PATH`.
pub fn find_java(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = configured {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(DevloopError::Config(format!(
            "configured java executable {:?} does not exist",
            path
        )));
    }

    if let Some(home) = env::var_os("JAVA_HOME") {
        let candidate = Path::new(&home).join("bin").join(java_binary_name());
        debug!(candidate = ?candidate, "looking for java in JAVA_HOME");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    if let Some(found) = find_on_path(java_binary_name()) {
        return Ok(found);
    }

    Err(DevloopError::Config(
        "unable to find the java executable (set [app].java or JAVA_HOME)".to_string(),
    ))
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
