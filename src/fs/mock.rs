// src/fs/mock.rs

use super::{EntryKind, EntryMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified: u64 },
    Dir { children: Vec<String>, modified: u64 },
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Logical clock; every mutation advances it so timestamps always move.
    clock: u64,
}

/// In-memory filesystem with deterministic modification times.
///
/// Every mutation ticks a logical clock, and creating or removing an entry
/// also bumps its parent directory's timestamp, the way a real filesystem
/// does.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn parent_of(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        if path == Path::new(".") {
            None
        } else {
            Some(PathBuf::from("."))
        }
    } else {
        Some(parent.to_path_buf())
    }
}

fn name_of(path: &Path) -> Option<String> {
    path.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

fn to_time(tick: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(tick)
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.create_dir(".");
        fs
    }

    /// Create or overwrite a file, creating missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;

        let existed = state.entries.contains_key(&path);
        state.entries.insert(
            path.clone(),
            MockEntry::File {
                content: content.into(),
                modified: tick,
            },
        );
        if !existed {
            Self::link_into_parent(&mut state, &path, tick);
        }
    }

    /// Create a directory (and its parents) if missing.
    pub fn create_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;
        Self::ensure_dir(&mut state, &path, tick);
    }

    /// Advance a path's timestamp without changing its content.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;
        match state.entries.get_mut(path.as_ref()) {
            Some(MockEntry::File { modified, .. }) | Some(MockEntry::Dir { modified, .. }) => {
                *modified = tick;
            }
            None => {}
        }
    }

    /// Remove a file or a whole directory subtree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let tick = state.clock;

        state.entries.retain(|p, _| !p.starts_with(&path));

        if let (Some(parent), Some(name)) = (parent_of(&path), name_of(&path)) {
            if let Some(MockEntry::Dir { children, modified }) = state.entries.get_mut(&parent) {
                children.retain(|c| c != &name);
                *modified = tick;
            }
        }
    }

    fn ensure_dir(state: &mut MockState, path: &Path, tick: u64) {
        if state.entries.contains_key(path) {
            return;
        }
        state.entries.insert(
            path.to_path_buf(),
            MockEntry::Dir {
                children: Vec::new(),
                modified: tick,
            },
        );
        Self::link_into_parent(state, path, tick);
    }

    fn link_into_parent(state: &mut MockState, path: &Path, tick: u64) {
        let (Some(parent), Some(name)) = (parent_of(path), name_of(path)) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir(state, &parent, tick);
        if let Some(MockEntry::Dir { children, modified }) = state.entries.get_mut(&parent) {
            if !children.contains(&name) {
                children.push(name);
                *modified = tick;
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir { .. }) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir { .. }))
    }

    fn metadata(&self, path: &Path) -> Result<EntryMeta> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File { content, modified }) => Ok(EntryMeta {
                kind: EntryKind::File,
                modified: Some(to_time(*modified)),
                len: content.len() as u64,
            }),
            Some(MockEntry::Dir { modified, .. }) => Ok(EntryMeta {
                kind: EntryKind::Dir,
                modified: Some(to_time(*modified)),
                len: 0,
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
