// src/watch/detector.rs

//! Polling change detector.
//!
//! Each poll re-walks the watch root and compares what it finds with the
//! snapshot taken by the previous poll. Only the yes/no answer leaves this
//! module; the snapshot itself stays private.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::errors::{DevloopError, Result};
use crate::fs::{EntryKind, FileSystem, RealFileSystem};
use crate::watch::hash::compute_file_hash;
use crate::watch::patterns::{relative_str, PathFilter};
use crate::watch::{ChangeSource, WatchSpec};

/// Last known state of one watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    kind: EntryKind,
    modified: Option<SystemTime>,
    len: u64,
    digest: Option<String>,
}

/// Keyed by the root-relative path with `/` separators.
type Snapshot = BTreeMap<String, Fingerprint>;

/// Counts of what differed between two snapshots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SnapshotDiff {
    added: usize,
    removed: usize,
    modified: usize,
}

impl SnapshotDiff {
    fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified == 0
    }
}

/// Answers "has anything under the watched root changed since last time?".
pub struct ChangeDetector {
    spec: WatchSpec,
    filter: PathFilter,
    fs: Arc<dyn FileSystem>,
    snapshot: Option<Snapshot>,
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("root", &self.spec.root)
            .field("tracked", &self.snapshot.as_ref().map(|s| s.len()))
            .finish_non_exhaustive()
    }
}

impl ChangeDetector {
    /// Take the initial snapshot of `spec.root` on the real filesystem.
    pub fn initialize(spec: WatchSpec) -> Result<Self> {
        Self::with_fs(spec, Arc::new(RealFileSystem))
    }

    /// Take the initial snapshot using the given filesystem.
    pub fn with_fs(spec: WatchSpec, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let filter = PathFilter::new(&spec.includes, &spec.excludes)
            .map_err(|e| DevloopError::Config(format!("invalid watch patterns: {e:#}")))?;

        let mut detector = Self {
            spec,
            filter,
            fs,
            snapshot: None,
        };

        let snapshot = detector.scan(None)?;
        info!(
            root = ?detector.spec.root,
            tracked = snapshot.len(),
            "watching for changes"
        );
        detector.snapshot = Some(snapshot);
        Ok(detector)
    }

    pub fn spec(&self) -> &WatchSpec {
        &self.spec
    }

    /// Re-scan the root and report whether any filtered path was added,
    /// removed or modified since the previous call.
    pub fn poll_for_changes(&mut self) -> Result<bool> {
        let Some(previous) = self.snapshot.take() else {
            debug!("poll on a closed change detector");
            return Ok(false);
        };

        let current = match self.scan(Some(&previous)) {
            Ok(current) => current,
            Err(e) => {
                // Keep the old snapshot so a later poll compares against it.
                self.snapshot = Some(previous);
                return Err(e);
            }
        };

        let diff = diff_snapshots(&previous, &current, self.spec.use_hash);
        self.snapshot = Some(current);

        if diff.is_empty() {
            debug!(root = ?self.spec.root, "no changes");
            Ok(false)
        } else {
            info!(
                root = ?self.spec.root,
                added = diff.added,
                removed = diff.removed,
                modified = diff.modified,
                "change detected"
            );
            Ok(true)
        }
    }

    /// Drop the snapshot. Safe to call more than once.
    pub fn close(&mut self) {
        if self.snapshot.take().is_some() {
            debug!(root = ?self.spec.root, "change detector closed");
        }
    }

    /// Walk the root and fingerprint every path the filter accepts.
    ///
    /// `previous` lets hash mode reuse digests of files whose timestamp and
    /// length did not move.
    fn scan(&self, previous: Option<&Snapshot>) -> Result<Snapshot> {
        let root = &self.spec.root;
        if !self.fs.is_dir(root) {
            return Err(DevloopError::ChangeDetection(format!(
                "watch root {:?} does not exist or is not a directory",
                root
            )));
        }

        let mut snapshot = Snapshot::new();
        let mut stack = vec![root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if &dir == root => {
                    return Err(DevloopError::ChangeDetection(format!(
                        "reading watch root {:?}: {e:#}",
                        root
                    )));
                }
                Err(e) => {
                    // Removed between listing its parent and reading it.
                    debug!(dir = ?dir, error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            for path in entries {
                let Ok(meta) = self.fs.metadata(&path) else {
                    continue;
                };
                if meta.kind == EntryKind::Dir {
                    stack.push(path.clone());
                }

                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                if !self.filter.matches(&rel) {
                    continue;
                }

                let digest = self.digest_for(&path, &rel, meta.kind, meta.modified, meta.len, previous);
                snapshot.insert(
                    rel,
                    Fingerprint {
                        kind: meta.kind,
                        modified: meta.modified,
                        len: meta.len,
                        digest,
                    },
                );
            }
        }

        Ok(snapshot)
    }

    fn digest_for(
        &self,
        path: &Path,
        rel: &str,
        kind: EntryKind,
        modified: Option<SystemTime>,
        len: u64,
        previous: Option<&Snapshot>,
    ) -> Option<String> {
        if !self.spec.use_hash || kind != EntryKind::File {
            return None;
        }

        if let Some(old) = previous.and_then(|s| s.get(rel)) {
            if old.kind == kind && old.modified == modified && old.len == len && old.digest.is_some() {
                return old.digest.clone();
            }
        }

        match compute_file_hash(self.fs.as_ref(), path) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(path = ?path, error = %e, "failed to hash watched file");
                None
            }
        }
    }
}

impl ChangeSource for ChangeDetector {
    fn poll_for_changes(&mut self) -> Result<bool> {
        ChangeDetector::poll_for_changes(self)
    }

    fn close(&mut self) {
        ChangeDetector::close(self)
    }
}

impl Drop for ChangeDetector {
    fn drop(&mut self) {
        self.close();
    }
}

fn diff_snapshots(previous: &Snapshot, current: &Snapshot, use_hash: bool) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();

    for (path, new) in current {
        match previous.get(path) {
            None => diff.added += 1,
            Some(old) if fingerprint_changed(old, new, use_hash) => diff.modified += 1,
            Some(_) => {}
        }
    }
    diff.removed = previous.keys().filter(|p| !current.contains_key(*p)).count();

    diff
}

fn fingerprint_changed(old: &Fingerprint, new: &Fingerprint, use_hash: bool) -> bool {
    if old.kind != new.kind {
        return true;
    }
    if !use_hash {
        return old.modified != new.modified || old.len != new.len;
    }
    match new.kind {
        // Structure changes show up as added/removed children.
        EntryKind::Dir => false,
        EntryKind::File => match (&old.digest, &new.digest) {
            (Some(a), Some(b)) => a != b,
            // Unhashable on either side: fall back to metadata.
            _ => old.modified != new.modified || old.len != new.len,
        },
    }
}

/// Convenience used by `--dry-run`: the files currently matched by `spec`.
pub fn matching_paths(fs: &dyn FileSystem, spec: &WatchSpec) -> Result<Vec<PathBuf>> {
    let filter = PathFilter::new(&spec.includes, &spec.excludes)
        .map_err(|e| DevloopError::Config(format!("invalid watch patterns: {e:#}")))?;
    let mut out = Vec::new();
    let mut stack = vec![spec.root.clone()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if let Some(rel) = relative_str(&spec.root, &path) {
                if filter.matches(&rel) {
                    out.push(path);
                }
            }
        }
    }
    out.sort();
    Ok(out)
}
