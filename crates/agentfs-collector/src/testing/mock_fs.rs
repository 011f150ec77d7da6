// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Mock filesystem for call counting and fault injection
//!
//! `FaultInjectingFs` delegates every operation to an inner [`FileSystem`] but
//! can be configured to fail operations according to a [`FailureBehavior`].

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{FsError, FsResult};
use crate::{DirEntry, FileSystem, Status};

/// Custom predicate deciding per (operation, path) whether to fail
pub type FaultPredicate = Arc<dyn Fn(&str, &Path) -> Option<FsError> + Send + Sync>;

/// Configurable failure behavior for mock filesystem operations
pub enum FailureBehavior {
    /// Never fail
    AlwaysSucceed,

    /// Always fail a specific operation
    AlwaysFail {
        op: &'static str,
        error_fn: Arc<dyn Fn() -> FsError + Send + Sync>,
    },

    /// Fail a specific operation for one path only
    FailPath {
        op: &'static str,
        path: PathBuf,
        error_fn: Arc<dyn Fn() -> FsError + Send + Sync>,
    },

    Custom(FaultPredicate),
}

impl Default for FailureBehavior {
    fn default() -> Self {
        Self::AlwaysSucceed
    }
}

pub struct FaultInjectingFs {
    inner: Arc<dyn FileSystem>,
    behavior: Mutex<FailureBehavior>,
    call_counts: Mutex<HashMap<String, AtomicU64>>,
}

impl FaultInjectingFs {
    /// Wrap `inner` without injecting failures
    pub fn new(inner: Arc<dyn FileSystem>) -> Self {
        Self::with_behavior(inner, FailureBehavior::AlwaysSucceed)
    }

    pub fn with_behavior(inner: Arc<dyn FileSystem>, behavior: FailureBehavior) -> Self {
        Self {
            inner,
            behavior: Mutex::new(behavior),
            call_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_behavior(&self, behavior: FailureBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Number of times `op` has been called
    pub fn call_count(&self, op: &str) -> u64 {
        self.call_counts
            .lock()
            .unwrap()
            .get(op)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn reset_counters(&self) {
        let counts = self.call_counts.lock().unwrap();
        for counter in counts.values() {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn check_fault(&self, op: &str, path: &Path) -> FsResult<()> {
        let mut counts_guard = self.call_counts.lock().unwrap();
        counts_guard
            .entry(op.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::SeqCst);
        drop(counts_guard);

        let behavior_guard = self.behavior.lock().unwrap();
        match &*behavior_guard {
            FailureBehavior::AlwaysSucceed => Ok(()),
            FailureBehavior::AlwaysFail { op: target, error_fn } => {
                if op == *target {
                    Err(error_fn())
                } else {
                    Ok(())
                }
            }
            FailureBehavior::FailPath {
                op: target,
                path: target_path,
                error_fn,
            } => {
                if op == *target && path == target_path {
                    Err(error_fn())
                } else {
                    Ok(())
                }
            }
            FailureBehavior::Custom(predicate) => match predicate(op, path) {
                Some(err) => Err(err),
                None => Ok(()),
            },
        }
    }
}

impl FileSystem for FaultInjectingFs {
    fn status(&self, path: &Path) -> FsResult<Status> {
        self.check_fault("status", path)?;
        self.inner.status(path)
    }

    fn open_for_read(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        self.check_fault("open_for_read", path)?;
        self.inner.open_for_read(path)
    }

    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        self.check_fault("read_dir", path)?;
        self.inner.read_dir(path)
    }

    fn real_path(&self, path: &Path) -> FsResult<PathBuf> {
        self.check_fault("real_path", path)?;
        self.inner.real_path(path)
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        self.check_fault("copy", src)?;
        self.inner.copy(src, dst)
    }

    fn create_directories(&self, path: &Path) -> FsResult<()> {
        self.check_fault("create_directories", path)?;
        self.inner.create_directories(path)
    }

    fn current_dir(&self) -> FsResult<PathBuf> {
        self.check_fault("current_dir", Path::new(""))?;
        self.inner.current_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_counts_and_delegates() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("f.txt");
        std::fs::write(&file, b"data").unwrap();

        let fs = FaultInjectingFs::new(Arc::new(RealFileSystem::new()));
        assert_eq!(fs.status(&file).unwrap().len, 4);
        assert!(fs.exists(&file));
        assert_eq!(fs.call_count("status"), 2);

        fs.reset_counters();
        assert_eq!(fs.call_count("status"), 0);
        assert_eq!(fs.call_count("never_called"), 0);
    }

    #[test]
    fn test_fail_path_only_hits_that_path() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good");
        let bad = temp_dir.path().join("bad");
        std::fs::write(&good, b"g").unwrap();
        std::fs::write(&bad, b"b").unwrap();

        let fs = FaultInjectingFs::with_behavior(
            Arc::new(RealFileSystem::new()),
            FailureBehavior::FailPath {
                op: "status",
                path: bad.clone(),
                error_fn: Arc::new(|| FsError::NotFound),
            },
        );
        assert!(fs.status(&good).is_ok());
        assert!(matches!(fs.status(&bad), Err(FsError::NotFound)));

        fs.set_behavior(FailureBehavior::Custom(Arc::new(|op, _| {
            (op == "read_dir").then_some(FsError::Unsupported)
        })));
        assert!(fs.status(&bad).is_ok());
        assert!(matches!(fs.read_dir(temp_dir.path()), Err(FsError::Unsupported)));
    }
}
