// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling Ant-style `includes` / `excludes` patterns (`patterns`).
//! - Polling the watch root and reporting whether anything changed
//!   (`detector`).
//! - Content hashing for `use_hash = true` and for comparing build output
//!   trees (`hash`).
//!
//! It knows nothing about processes or builds; it only answers "did anything
//! change?".

use std::path::PathBuf;
use std::time::Duration;

use crate::config::RedeployConfig;
use crate::errors::Result;

pub mod detector;
pub mod hash;
pub mod patterns;

pub use detector::ChangeDetector;
pub use hash::{compute_file_hash, compute_tree_hash};
pub use patterns::PathFilter;

/// What to watch and how often.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSpec {
    /// Absolute directory to scan.
    pub root: PathBuf,
    /// Ant-style patterns relative to `root`; empty means "everything".
    pub includes: Vec<String>,
    /// Ant-style patterns relative to `root`; these always win.
    pub excludes: Vec<String>,
    pub scan_interval: Duration,
    /// Compare file contents instead of timestamps only.
    pub use_hash: bool,
}

impl WatchSpec {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            scan_interval: Duration::from_millis(250),
            use_hash: false,
        }
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.includes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.excludes.push(pattern.to_string());
        self
    }

    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.use_hash = val;
        self
    }

    pub fn from_config(cfg: &RedeployConfig) -> Self {
        Self {
            root: cfg.root.clone(),
            includes: cfg.includes.clone(),
            excludes: cfg.excludes.clone(),
            scan_interval: cfg.scan_period,
            use_hash: cfg.use_hash,
        }
    }
}

/// Anything the redeploy loop can ask "did something change?".
///
/// [`ChangeDetector`] is the production implementation; tests script their
/// own answers.
pub trait ChangeSource {
    fn poll_for_changes(&mut self) -> Result<bool>;

    /// Release whatever the source holds. Must be idempotent.
    fn close(&mut self) {}
}
