// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Filesystem wrapper that records every path it successfully resolves
//!
//! Consumers keep doing ordinary filesystem work against
//! [`CollectorFileSystem`]; the owning [`FileCollector`] fills up as a side
//! effect. Recording never changes what the wrapped call returns.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::collector::FileCollector;
use crate::error::FsResult;
use crate::{DirEntry, FileSystem, Status};

pub struct CollectorFileSystem {
    base: Arc<dyn FileSystem>,
    collector: Arc<FileCollector>,
}

impl CollectorFileSystem {
    pub fn new(base: Arc<dyn FileSystem>, collector: Arc<FileCollector>) -> Self {
        Self { base, collector }
    }

    fn record(&self, path: &Path) {
        if let Err(err) = self.collector.add_file(path) {
            debug!(path = %path.display(), error = %err, "Ignoring collector tracking failure");
        }
    }
}

impl FileSystem for CollectorFileSystem {
    fn status(&self, path: &Path) -> FsResult<Status> {
        let result = self.base.status(path);
        if result.is_ok() {
            self.record(path);
        }
        result
    }

    fn open_for_read(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        let result = self.base.open_for_read(path);
        if result.is_ok() {
            self.record(path);
        }
        result
    }

    /// Records the directory and its immediate entries; deeper levels are
    /// recorded as the consumer descends into them.
    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        let entries = self.base.read_dir(path)?;
        self.record(path);
        for entry in &entries {
            self.record(&entry.path);
        }
        Ok(entries)
    }

    fn real_path(&self, path: &Path) -> FsResult<PathBuf> {
        let output = self.base.real_path(path)?;
        self.record(path);
        if output != path {
            self.record(&output);
        }
        Ok(output)
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        self.base.copy(src, dst)
    }

    fn create_directories(&self, path: &Path) -> FsResult<()> {
        self.base.create_directories(path)
    }

    fn current_dir(&self) -> FsResult<PathBuf> {
        self.base.current_dir()
    }
}
