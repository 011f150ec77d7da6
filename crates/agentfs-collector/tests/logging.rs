// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use agentfs_collector::logging::{collector_subscriber, level_filter, Level, LogFormat};
use agentfs_collector::{
    DirEntry, FileCollector, FileSystem, FileType, FsError, FsResult, Status,
};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with collector events at `level` captured into a string
fn capture_logs(level: Level, format: LogFormat, f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = collector_subscriber(level_filter(level), format, move || sink.clone());
    tracing::subscriber::with_default(subscriber, f);
    captured.text()
}

/// Filesystem that claims every path is a regular file without touching disk
struct InventedFiles;

impl FileSystem for InventedFiles {
    fn status(&self, path: &Path) -> FsResult<Status> {
        Ok(Status {
            path: path.to_path_buf(),
            file_type: FileType::File,
            len: 0,
            readonly: true,
        })
    }

    fn open_for_read(&self, _path: &Path) -> FsResult<Box<dyn Read + Send>> {
        Ok(Box::new(io::empty()))
    }

    fn read_dir(&self, _path: &Path) -> FsResult<Vec<DirEntry>> {
        Err(FsError::Unsupported)
    }

    fn real_path(&self, path: &Path) -> FsResult<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn copy(&self, _src: &Path, _dst: &Path) -> FsResult<()> {
        Err(FsError::Unsupported)
    }

    fn create_directories(&self, _path: &Path) -> FsResult<()> {
        Err(FsError::Unsupported)
    }

    fn current_dir(&self) -> FsResult<PathBuf> {
        Ok(PathBuf::from("/"))
    }
}

#[test]
fn swallowed_tracking_failure_is_logged_at_debug() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    // The collector checks the host disk, where the invented file does not exist
    let collector = Arc::new(FileCollector::new(&out, &out));
    let vfs = FileCollector::create_collector_vfs(Arc::new(InventedFiles), collector.clone());
    let invented = temp_dir.path().join("invented.h");

    let logs = capture_logs(Level::DEBUG, LogFormat::Plaintext, || {
        let status = vfs.status(&invented).unwrap();
        assert!(status.is_file());
    });

    assert!(collector.mapping_entries().is_empty());
    assert!(logs.contains("Ignoring collector tracking failure"), "{logs}");
    assert!(logs.contains("invented.h"), "{logs}");
}

#[test]
fn warn_level_hides_tracking_noise() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    let collector = Arc::new(FileCollector::new(&out, &out));
    let vfs = FileCollector::create_collector_vfs(Arc::new(InventedFiles), collector);

    let logs = capture_logs(Level::WARN, LogFormat::Plaintext, || {
        vfs.status(&temp_dir.path().join("invented.h")).unwrap();
    });

    assert!(!logs.contains("Ignoring collector tracking failure"), "{logs}");
}

#[cfg(unix)]
#[test]
fn skipped_walk_entry_is_warned_about() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), src.join("a_dangling")).unwrap();
    std::fs::write(src.join("b.txt"), b"b").unwrap();
    let out = temp_dir.path().join("out");
    let collector = FileCollector::new(&out, &out);

    let logs = capture_logs(Level::WARN, LogFormat::Plaintext, || {
        collector.add_directory(&src).unwrap();
    });

    assert!(logs.contains("Skipping unresolvable entry"), "{logs}");
    assert!(logs.contains("a_dangling"), "{logs}");
    assert_eq!(collector.mapping_entries().len(), 2);
}

#[test]
fn copy_failures_are_logged_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("gone.txt");
    std::fs::write(&file, b"soon gone").unwrap();
    let out = temp_dir.path().join("out");
    let collector = FileCollector::new(&out, &out);
    collector.add_file(&file).unwrap();
    std::fs::remove_file(&file).unwrap();

    let logs = capture_logs(Level::INFO, LogFormat::Json, || {
        assert!(collector.copy_files(false).is_err());
    });

    let line = logs
        .lines()
        .find(|line| line.contains("Failed to copy collected entry"))
        .unwrap_or_else(|| panic!("no copy failure event in {logs}"));
    assert!(line.starts_with('{'), "{line}");
    assert!(line.contains("\"level\":\"WARN\""), "{line}");
    assert!(line.contains("\"target\":\"agentfs_collector::copy\""), "{line}");
    assert!(line.contains("gone.txt"), "{line}");
}
