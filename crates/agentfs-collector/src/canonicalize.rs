// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path normalization and the symlink resolution cache

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and drop `.` and `..` components lexically.
///
/// `..` never climbs above the root. An empty input stays empty so the
/// caller can reject it.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::new();
    }

    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = base.join(path);
        joined.as_path()
    };

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                }
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}

/// Strip the prefix and root of an absolute path so it can be re-rooted
pub fn relative_to_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .collect()
}

/// Split a virtual path into the directory that gets resolved and the leaf
/// name appended afterwards. Paths without a parent resolve as a whole.
pub fn split_for_resolution(virtual_path: &Path) -> (&Path, Option<&OsStr>) {
    match (virtual_path.parent(), virtual_path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => (parent, Some(name)),
        _ => (virtual_path, None),
    }
}

/// Cache of resolved real paths keyed by the virtual directory they were
/// computed for. Entries are never invalidated during a collection session.
#[derive(Debug, Default)]
pub struct SymlinkCache {
    dirs: HashMap<PathBuf, PathBuf>,
}

impl SymlinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dir: &Path) -> Option<&PathBuf> {
        self.dirs.get(dir)
    }

    /// Store a resolution and return the cached value. The first insertion
    /// for a directory wins, so racing resolvers agree on one answer.
    pub fn insert(&mut self, dir: PathBuf, real_dir: PathBuf) -> PathBuf {
        self.dirs.entry(dir).or_insert(real_dir).clone()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
