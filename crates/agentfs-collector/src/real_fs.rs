// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Host filesystem implementation of the [`FileSystem`] capability

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsResult};
use crate::{DirEntry, FileSystem, FileType, Status};

/// Direct access to the host filesystem through `std::fs`
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn status(&self, path: &Path) -> FsResult<Status> {
        let metadata = std::fs::metadata(path).map_err(FsError::from_io)?;
        Ok(Status {
            path: path.to_path_buf(),
            file_type: FileType::from_std(metadata.file_type()),
            len: metadata.len(),
            readonly: metadata.permissions().readonly(),
        })
    }

    fn open_for_read(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        let file = std::fs::File::open(path).map_err(FsError::from_io)?;
        Ok(Box::new(file))
    }

    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        let entries = std::fs::read_dir(path).map_err(FsError::from_io)?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            result.push(DirEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().to_string(),
                file_type: FileType::from_std(file_type),
            });
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result)
    }

    fn real_path(&self, path: &Path) -> FsResult<PathBuf> {
        std::fs::canonicalize(path).map_err(FsError::from_io)
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        // std::fs::copy also carries over the permission bits
        std::fs::copy(src, dst).map_err(FsError::from_io)?;
        Ok(())
    }

    fn create_directories(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(FsError::from_io)
    }

    fn current_dir(&self) -> FsResult<PathBuf> {
        Ok(std::env::current_dir()?)
    }
}
