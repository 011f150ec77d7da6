// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File collector: records touched paths, snapshots them under a root and
//! writes the virtual to real mapping

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::canonicalize::{normalize_path, relative_to_root, split_for_resolution, SymlinkCache};
use crate::config::CollectorConfig;
use crate::copy::{copy_entries, CopyOutcome};
use crate::error::{CollectorError, CollectorResult};
use crate::mapping::{
    is_case_sensitive_path, MappingEntry, MappingWriter, OverlayMappingWriter, OverlayOptions,
};
use crate::vfs::CollectorFileSystem;
use crate::walk::RecursiveDirectoryIter;
use crate::{FileSystem, FileType, RealFileSystem};

/// Mutable bookkeeping shared by all callers. Guarded by one mutex that is
/// never held across filesystem I/O.
struct CollectorState {
    /// Virtual paths already recorded
    seen: HashSet<PathBuf>,
    symlinks: SymlinkCache,
    writer: Box<dyn MappingWriter>,
}

/// Collects files into a root directory and generates a mapping that lets a
/// virtual filesystem substitute the copies for the originals.
///
/// One collector lives for one collection session. Root and overlay root are
/// fixed at construction; the root is only created when files are copied.
pub struct FileCollector {
    root: PathBuf,
    overlay_root: PathBuf,
    fs: Arc<dyn FileSystem>,
    overlay: OverlayOptions,
    stop_on_error: bool,
    state: Mutex<CollectorState>,
}

impl FileCollector {
    /// Collector over the host filesystem
    pub fn new(root: impl Into<PathBuf>, overlay_root: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(root, overlay_root, Arc::new(RealFileSystem::new()))
    }

    /// Collector that stats, resolves and copies through `fs`
    pub fn with_filesystem(
        root: impl Into<PathBuf>,
        overlay_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self::with_writer(root, overlay_root, fs, Box::new(OverlayMappingWriter::new()))
    }

    pub fn with_writer(
        root: impl Into<PathBuf>,
        overlay_root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        writer: Box<dyn MappingWriter>,
    ) -> Self {
        let root = root.into();
        let overlay_root = overlay_root.into();
        debug!(root = %root.display(), overlay_root = %overlay_root.display(), "Creating file collector");
        Self {
            overlay: OverlayOptions {
                overlay_dir: Some(overlay_root.clone()),
                ..Default::default()
            },
            root,
            overlay_root,
            fs,
            stop_on_error: true,
            state: Mutex::new(CollectorState {
                seen: HashSet::new(),
                symlinks: SymlinkCache::new(),
                writer,
            }),
        }
    }

    /// Collector over the host filesystem configured from `config`
    pub fn from_config(config: &CollectorConfig) -> Self {
        let mut collector = Self::new(&config.root, &config.overlay_root);
        collector.overlay.case_sensitive = config.case_sensitive;
        collector.overlay.overlay_relative = config.overlay_relative;
        collector.overlay.use_external_names = config.use_external_names;
        collector.stop_on_error = config.stop_on_error;
        collector
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn overlay_root(&self) -> &Path {
        &self.overlay_root
    }

    /// Record a single file (or directory entry) for mapping and copying.
    ///
    /// Recording the same path again is a no-op. A path that cannot be stat'ed
    /// or resolved is not recorded and the error is returned.
    pub fn add_file(&self, path: impl AsRef<Path>) -> CollectorResult<()> {
        let virtual_path = self.virtual_path(path.as_ref())?;
        if !self.mark_as_seen(&virtual_path) {
            trace!(path = %virtual_path.display(), "Skipping already seen path");
            return Ok(());
        }
        self.add_file_impl(&virtual_path)
    }

    /// Record `dir` and everything below it.
    pub fn add_directory(&self, dir: impl AsRef<Path>) -> CollectorResult<()> {
        self.add_directory_with(self.fs.as_ref(), dir.as_ref())
    }

    /// Walk `dir` through `fs`, recording the directory and each entry.
    ///
    /// Enumeration errors end the walk; entries recorded so far are kept.
    /// An entry that cannot be stat'ed or resolved (a dangling symlink, a
    /// file removed mid-walk) is skipped and the walk goes on.
    pub(crate) fn add_directory_with(&self, fs: &dyn FileSystem, dir: &Path) -> CollectorResult<()> {
        let walker = RecursiveDirectoryIter::new(fs, dir)?;
        self.add_walked_path(dir);

        for entry in walker {
            let entry = entry?;
            match entry.file_type {
                FileType::File | FileType::Directory | FileType::Symlink => {
                    self.add_walked_path(&entry.path)
                }
                FileType::Other => {
                    trace!(path = %entry.path.display(), "Skipping special file");
                }
            }
        }
        Ok(())
    }

    fn add_walked_path(&self, path: &Path) {
        if let Err(err) = self.add_file(path) {
            warn!(path = %path.display(), error = %err, "Skipping unresolvable entry");
        }
    }

    /// Write the overlay mapping to `mapping_file`. Can be called any number
    /// of times; each call exports the current state.
    pub fn write_mapping(&self, mapping_file: impl AsRef<Path>) -> CollectorResult<()> {
        let mapping_file = mapping_file.as_ref();
        let mut buffer = Vec::new();
        self.write_mapping_to(&mut buffer)?;
        std::fs::write(mapping_file, buffer).map_err(|source| CollectorError::MappingWrite {
            path: mapping_file.to_path_buf(),
            source,
        })?;
        debug!(path = %mapping_file.display(), "Wrote collector mapping");
        Ok(())
    }

    /// Serialize the overlay mapping into `out`
    pub fn write_mapping_to(&self, out: &mut dyn Write) -> CollectorResult<()> {
        let options = self.resolved_overlay_options();
        let mut buffer = Vec::new();
        self.state().writer.write(&options, &mut buffer)?;
        out.write_all(&buffer).map_err(CollectorError::MappingOutput)
    }

    /// Copy every recorded entry into the root directory.
    ///
    /// With `stop_on_error` the first failure aborts the copy. Otherwise all
    /// entries are attempted and the first failure is returned at the end.
    pub fn copy_files(&self, stop_on_error: bool) -> CollectorResult<()> {
        self.copy_files_with_report(stop_on_error).into_result().map(|_| ())
    }

    /// Like [`copy_files`](Self::copy_files) but keeps per-entry results
    pub fn copy_files_with_report(&self, stop_on_error: bool) -> CopyOutcome {
        let entries = self.mapping_entries();
        debug!(root = %self.root.display(), entries = entries.len(), stop_on_error, "Copying collected files");
        copy_entries(self.fs.as_ref(), &self.root, &entries, stop_on_error)
    }

    /// Copy with the stop-on-error policy the collector was configured with
    pub fn materialize(&self) -> CollectorResult<()> {
        self.copy_files(self.stop_on_error)
    }

    /// Snapshot of the recorded mappings in insertion order
    pub fn mapping_entries(&self) -> Vec<MappingEntry> {
        self.state().writer.mappings().to_vec()
    }

    /// Number of distinct virtual paths observed, recorded or not
    pub fn seen_count(&self) -> usize {
        self.state().seen.len()
    }

    /// Wrap `base` so every path it successfully resolves is recorded here
    pub fn create_collector_vfs(
        base: Arc<dyn FileSystem>,
        collector: Arc<FileCollector>,
    ) -> Arc<dyn FileSystem> {
        Arc::new(CollectorFileSystem::new(base, collector))
    }

    fn state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_as_seen(&self, virtual_path: &Path) -> bool {
        if virtual_path.as_os_str().is_empty() {
            return false;
        }
        self.state().seen.insert(virtual_path.to_path_buf())
    }

    fn virtual_path(&self, path: &Path) -> CollectorResult<PathBuf> {
        if path.as_os_str().is_empty() || path.is_absolute() {
            return Ok(normalize_path(path, Path::new("")));
        }
        let cwd = self.fs.current_dir().map_err(|source| CollectorError::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(normalize_path(path, &cwd))
    }

    fn add_file_impl(&self, virtual_path: &Path) -> CollectorResult<()> {
        let status = self.fs.status(virtual_path).map_err(|source| {
            CollectorError::PathResolution {
                path: virtual_path.to_path_buf(),
                source,
            }
        })?;
        let real_path = self.resolve_real_path(virtual_path)?;
        let destination = self.root.join(relative_to_root(&real_path));

        let mut state = self.state();
        if status.is_dir() {
            state.writer.add_directory_mapping(virtual_path, &destination);
        } else {
            state.writer.add_file_mapping(virtual_path, &destination);
        }
        drop(state);

        debug!(
            path = %virtual_path.display(),
            destination = %destination.display(),
            is_directory = status.is_dir(),
            "Recorded collected path"
        );
        Ok(())
    }

    /// Resolve symlinks in the parent directory of `virtual_path` and append
    /// the file name. Directory resolutions are cached for the session.
    fn resolve_real_path(&self, virtual_path: &Path) -> CollectorResult<PathBuf> {
        let (dir, name) = split_for_resolution(virtual_path);

        let cached = self.state().symlinks.get(dir).cloned();
        let real_dir = match cached {
            Some(real_dir) => real_dir,
            None => {
                let resolved =
                    self.fs.real_path(dir).map_err(|source| CollectorError::PathResolution {
                        path: virtual_path.to_path_buf(),
                        source,
                    })?;
                self.state().symlinks.insert(dir.to_path_buf(), resolved)
            }
        };

        Ok(match name {
            Some(name) => real_dir.join(name),
            None => real_dir,
        })
    }

    fn resolved_overlay_options(&self) -> OverlayOptions {
        let mut options = self.overlay.clone();
        if options.case_sensitive.is_none() {
            options.case_sensitive =
                Some(is_case_sensitive_path(self.fs.as_ref(), &self.overlay_root));
        }
        options
    }
}

/// Free-function form of [`FileCollector::create_collector_vfs`]
pub fn create_collector_vfs(
    base: Arc<dyn FileSystem>,
    collector: Arc<FileCollector>,
) -> Arc<dyn FileSystem> {
    FileCollector::create_collector_vfs(base, collector)
}
