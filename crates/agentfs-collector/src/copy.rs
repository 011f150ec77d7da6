// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Materialization of collected entries under the collector root

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CollectorError, CollectorResult};
use crate::mapping::MappingEntry;
use crate::FileSystem;

/// One entry that could not be copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    /// Virtual path of the failed entry
    pub path: PathBuf,
    pub message: String,
}

/// Counters for one copy run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: u64,
    pub directories: u64,
    pub failures: Vec<CopyFailure>,
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied={} directories={} failures={}",
            self.copied,
            self.directories,
            self.failures.len()
        )
    }
}

/// Result of a copy run: what happened plus the first error, if any
#[derive(Debug)]
pub struct CopyOutcome {
    pub report: CopyReport,
    pub error: Option<CollectorError>,
}

impl CopyOutcome {
    pub fn into_result(self) -> CollectorResult<CopyReport> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.report),
        }
    }
}

/// Copy every entry from its virtual path to its real path under `root`.
///
/// `root` is created first. With `stop_on_error` the first failing entry ends
/// the run; otherwise every entry is attempted and the first error is kept.
pub fn copy_entries(
    fs: &dyn FileSystem,
    root: &Path,
    entries: &[MappingEntry],
    stop_on_error: bool,
) -> CopyOutcome {
    let mut report = CopyReport::default();

    if let Err(source) = fs.create_directories(root) {
        warn!(root = %root.display(), error = %source, "Failed to create collector root");
        return CopyOutcome {
            report,
            error: Some(CollectorError::Copy {
                path: root.to_path_buf(),
                source,
            }),
        };
    }

    let mut first_error = None;
    for entry in entries {
        match copy_entry(fs, entry) {
            Ok(true) => report.directories += 1,
            Ok(false) => report.copied += 1,
            Err(err) => {
                warn!(
                    path = %entry.virtual_path.display(),
                    error = %err,
                    stop_on_error,
                    "Failed to copy collected entry"
                );
                report.failures.push(CopyFailure {
                    path: entry.virtual_path.clone(),
                    message: err.to_string(),
                });
                if first_error.is_none() {
                    first_error = Some(err);
                }
                if stop_on_error {
                    break;
                }
            }
        }
    }

    debug!(root = %root.display(), %report, "Copy finished");
    CopyOutcome {
        report,
        error: first_error,
    }
}

/// Returns `Ok(true)` for a directory entry, `Ok(false)` for a copied file
fn copy_entry(fs: &dyn FileSystem, entry: &MappingEntry) -> CollectorResult<bool> {
    let fail = |source| CollectorError::Copy {
        path: entry.virtual_path.clone(),
        source,
    };

    let status = fs.status(&entry.virtual_path).map_err(fail)?;

    if let Some(parent) = entry.real_path.parent() {
        fs.create_directories(parent).map_err(fail)?;
    }

    if status.is_dir() {
        fs.create_directories(&entry.real_path).map_err(fail)?;
        return Ok(true);
    }

    fs.copy(&entry.virtual_path, &entry.real_path).map_err(fail)?;
    Ok(false)
}
