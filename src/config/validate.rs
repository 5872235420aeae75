// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile, RedeployConfig, RedeploySection};
use crate::errors::{DevloopError, Result};
use crate::types::parse_duration;
use crate::watch::PathFilter;

/// Validate a raw config and resolve it against `project_dir`.
///
/// `project_dir` is the directory the config file lives in; every relative
/// path in the config is interpreted against it.
pub fn validate_config(raw: RawConfigFile, project_dir: impl Into<PathBuf>) -> Result<ConfigFile> {
    let project_dir = project_dir.into();

    validate_app(&raw)?;
    validate_build(&raw)?;
    let redeploy = validate_redeploy(&raw.redeploy, &project_dir)?;

    Ok(ConfigFile {
        project_dir,
        redeploy,
        app: raw.app,
        build: raw.build,
    })
}

fn validate_app(cfg: &RawConfigFile) -> Result<()> {
    if cfg.app.main_class.trim().is_empty() {
        return Err(DevloopError::Config(
            "[app].main_class must be set".to_string(),
        ));
    }

    if cfg.app.launcher.is_vertx() {
        let verticle = cfg.app.main_verticle.as_deref().unwrap_or("");
        if verticle.trim().is_empty() {
            return Err(DevloopError::Config(format!(
                "[app].main_verticle is required when launcher is {:?}",
                cfg.app.launcher
            )));
        }
    }

    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.compile.is_empty() {
        return Err(DevloopError::Config(
            "[build].compile must not be empty".to_string(),
        ));
    }
    if cfg.build.copy_resources.is_empty() {
        return Err(DevloopError::Config(
            "[build].copy_resources must not be empty".to_string(),
        ));
    }

    for (idx, step) in cfg.build.step.iter().enumerate() {
        if step.command.is_empty() {
            return Err(DevloopError::Config(format!(
                "[[build.step]] #{} ({}:{}) has an empty command",
                idx + 1,
                step.plugin,
                step.goal
            )));
        }
        if step.phase.trim().is_empty() {
            return Err(DevloopError::Config(format!(
                "[[build.step]] #{} ({}:{}) has no phase",
                idx + 1,
                step.plugin,
                step.goal
            )));
        }
    }

    Ok(())
}

fn validate_redeploy(section: &RedeploySection, project_dir: &Path) -> Result<RedeployConfig> {
    let scan_period = duration_field("scan_period", &section.scan_period)?;
    if scan_period.is_zero() {
        return Err(DevloopError::Config(
            "[redeploy].scan_period must be greater than zero".to_string(),
        ));
    }
    let grace_period = duration_field("grace_period", &section.grace_period)?;
    let stop_timeout = duration_field("stop_timeout", &section.stop_timeout)?;

    // Surface bad globs here rather than when the loop starts.
    PathFilter::new(&section.includes, &section.excludes)
        .map_err(|e| DevloopError::Config(format!("[redeploy] patterns: {e:#}")))?;

    let root = {
        let p = PathBuf::from(&section.root);
        if p.is_absolute() { p } else { project_dir.join(p) }
    };

    if section.enabled && !root.is_dir() {
        return Err(DevloopError::Config(format!(
            "[redeploy].root {:?} does not exist or is not a directory",
            root
        )));
    }

    Ok(RedeployConfig {
        enabled: section.enabled,
        root,
        includes: section.includes.clone(),
        excludes: section.excludes.clone(),
        scan_period,
        grace_period,
        stop_timeout,
        use_hash: section.use_hash,
    })
}

fn duration_field(name: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| DevloopError::Config(format!("[redeploy].{name}: {e}")))
}
