// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Resumable recursive directory enumeration

use std::path::{Path, PathBuf};

use crate::error::{CollectorError, CollectorResult};
use crate::{DirEntry, FileSystem, FileType};

/// Depth-first cursor over a directory tree.
///
/// Each directory is listed only when the cursor reaches it, so large trees
/// are never materialized up front. Symlinked directories are reported as
/// entries but not descended into. A directory that cannot be listed yields
/// one `Err(CollectorError::Enumeration)`; the caller may stop there or keep
/// iterating to visit the remaining siblings.
pub struct RecursiveDirectoryIter<'a> {
    fs: &'a dyn FileSystem,
    stack: Vec<std::vec::IntoIter<DirEntry>>,
    descend: Option<PathBuf>,
}

impl<'a> RecursiveDirectoryIter<'a> {
    /// Start a walk at `dir`. Fails if `dir` itself cannot be listed.
    pub fn new(fs: &'a dyn FileSystem, dir: &Path) -> CollectorResult<Self> {
        let entries = fs.read_dir(dir).map_err(|source| CollectorError::Enumeration {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            fs,
            stack: vec![entries.into_iter()],
            descend: None,
        })
    }

    /// Number of directories currently open on the cursor
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Iterator for RecursiveDirectoryIter<'_> {
    type Item = CollectorResult<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(dir) = self.descend.take() {
            match self.fs.read_dir(&dir) {
                Ok(children) => self.stack.push(children.into_iter()),
                Err(source) => {
                    return Some(Err(CollectorError::Enumeration { path: dir, source }));
                }
            }
        }

        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(entry) => {
                    if entry.file_type == FileType::Directory {
                        self.descend = Some(entry.path.clone());
                    }
                    return Some(Ok(entry));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
