// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core type definitions for the collector and the filesystem capability it wraps

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::FsResult;

/// Kind of filesystem object reported by [`FileSystem::status`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

impl FileType {
    pub fn from_std(file_type: std::fs::FileType) -> Self {
        if file_type.is_dir() {
            FileType::Directory
        } else if file_type.is_file() {
            FileType::File
        } else if file_type.is_symlink() {
            FileType::Symlink
        } else {
            FileType::Other
        }
    }
}

/// File status
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub path: PathBuf,
    pub file_type: FileType,
    pub len: u64,
    pub readonly: bool,
}

impl Status {
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Directory entry information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// Parent directory joined with `name`
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

/// Filesystem capability the collector reads through.
///
/// Implemented by the host filesystem ([`RealFileSystem`](crate::RealFileSystem)),
/// by the intercepting wrapper ([`CollectorFileSystem`](crate::CollectorFileSystem))
/// and by test doubles.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Get the status of a path, following symlinks
    fn status(&self, path: &Path) -> FsResult<Status>;

    /// Open a file for read-only access
    fn open_for_read(&self, path: &Path) -> FsResult<Box<dyn Read + Send>>;

    /// List the immediate contents of a directory
    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>>;

    /// Resolve every symlink component of `path` into an absolute path
    fn real_path(&self, path: &Path) -> FsResult<PathBuf>;

    /// Copy file bytes and permission bits, replacing `dst` if it exists
    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()>;

    /// Create `path` and any missing parents; existing directories are fine
    fn create_directories(&self, path: &Path) -> FsResult<()>;

    /// Directory relative paths are resolved against
    fn current_dir(&self) -> FsResult<PathBuf>;

    fn exists(&self, path: &Path) -> bool {
        self.status(path).is_ok()
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.status(path).map(|status| status.is_dir()).unwrap_or(false)
    }
}
