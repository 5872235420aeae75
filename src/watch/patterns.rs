// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Compiled include/exclude filter for paths relative to the watch root.
///
/// Patterns are Ant-style:
///
/// - `*` matches within a single path segment,
/// - `?` matches one character within a segment,
/// - `**` matches any number of segments (including none),
/// - a trailing `/` is shorthand for `/**`,
/// - `dir/**` also matches `dir` itself.
///
/// A path passes when (there are no includes OR an include matches) AND no
/// exclude matches.
#[derive(Clone)]
pub struct PathFilter {
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
    include_count: usize,
    exclude_count: usize,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("includes", &self.include_count)
            .field("excludes", &self.exclude_count)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        let include_set = if includes.is_empty() {
            None
        } else {
            Some(build_globset(includes).context("building include globset")?)
        };

        let exclude_set = if excludes.is_empty() {
            None
        } else {
            Some(build_globset(excludes).context("building exclude globset")?)
        };

        Ok(Self {
            include_set,
            exclude_set,
            include_count: includes.len(),
            exclude_count: excludes.len(),
        })
    }

    /// Returns true if `rel_path` (relative to the watch root, e.g.
    /// `"java/demo/Main.java"`) is a change candidate.
    pub fn matches(&self, rel_path: &str) -> bool {
        let rel_path = normalize_separators(rel_path);
        if let Some(include) = &self.include_set {
            if !include.is_match(rel_path.as_str()) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Translate one Ant-style pattern into the globs that express it.
fn ant_to_globs(pattern: &str) -> Vec<String> {
    let mut pat = normalize_separators(pattern.trim());
    if pat.ends_with('/') {
        pat.push_str("**");
    }

    let mut globs = vec![pat.clone()];
    // Ant lets `dir/**` match `dir` itself; globset does not.
    if let Some(base) = pat.strip_suffix("/**") {
        if !base.is_empty() {
            globs.push(base.to_string());
        }
    }
    globs
}

/// Build a GlobSet from Ant-style string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        for glob_src in ant_to_globs(pat) {
            let glob = GlobBuilder::new(&glob_src)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }
    }
    Ok(builder.build()?)
}

fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(normalize_separators(&rel.to_string_lossy()))
}
