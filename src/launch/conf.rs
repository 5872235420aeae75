// src/launch/conf.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, error, info};

use crate::errors::Result;

const CONF_EXTENSIONS: [&str; 3] = ["json", "yml", "yaml"];

/// Locate a configuration file for the application.
///
/// An explicit path is returned as given (resolved against `project_dir`),
/// even when it does not exist; that case is logged. Otherwise
/// `src/main/conf/<stem>.{json,yml,yaml}` is searched in that order.
///
/// YAML files are converted to JSON into `target/conf/<stem>.json` and the
/// converted path is returned.
pub fn locate_conf(project_dir: &Path, explicit: Option<&str>, stem: &str) -> Result<Option<PathBuf>> {
    let found = match explicit {
        Some(path) => {
            let path = resolve(project_dir, path);
            if !path.is_file() {
                error!(path = ?path, "configuration file does not exist");
                return Ok(Some(path));
            }
            path
        }
        None => {
            let conf_dir = project_dir.join("src").join("main").join("conf");
            let candidate = CONF_EXTENSIONS
                .iter()
                .map(|ext| conf_dir.join(format!("{stem}.{ext}")))
                .find(|p| p.is_file());
            match candidate {
                Some(path) => path,
                None => {
                    debug!(dir = ?conf_dir, stem, "no configuration file found");
                    return Ok(None);
                }
            }
        }
    };

    if is_yaml(&found) {
        let out_stem = found
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(stem)
            .to_string();
        let target = project_dir
            .join("target")
            .join("conf")
            .join(format!("{out_stem}.json"));
        convert_yaml_to_json(&found, &target)?;
        info!(from = ?found, to = ?target, "converted YAML configuration to JSON");
        return Ok(Some(target));
    }

    Ok(Some(found))
}

/// Convert a YAML document into a pretty-printed JSON file.
///
/// Parent directories of `target` are created as needed.
pub fn convert_yaml_to_json(source: &Path, target: &Path) -> Result<()> {
    let text = fs::read_to_string(source)
        .with_context(|| format!("failed to read YAML configuration {:?}", source))?;
    let value: serde_json::Value = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse YAML configuration {:?}", source))?;
    let json = serde_json::to_string_pretty(&value)
        .with_context(|| format!("failed to render {:?} as JSON", source))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, json)?;
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

fn resolve(project_dir: &Path, path: &str) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() { p } else { project_dir.join(p) }
}
