// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! AgentFS file collector
//!
//! Records every file a process touches through a [`FileSystem`] layer,
//! copies those files under a root directory and writes an overlay mapping
//! that lets a virtual filesystem substitute the copies for the originals.
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentfs_collector::{FileCollector, FileSystem, RealFileSystem};
//!
//! let collector = Arc::new(FileCollector::new("/tmp/snap/root", "/tmp/snap"));
//! let vfs = FileCollector::create_collector_vfs(Arc::new(RealFileSystem::new()), collector.clone());
//! let _ = vfs.status(std::path::Path::new("/usr/include/stdio.h"));
//! collector.copy_files(true)?;
//! collector.write_mapping("/tmp/snap/vfs.yaml")?;
//! # Ok::<(), agentfs_collector::CollectorError>(())
//! ```

pub mod canonicalize;
pub mod collector;
pub mod config;
pub mod copy;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod real_fs;
pub mod testing;
pub mod types;
pub mod vfs;
pub mod walk;

pub use collector::{create_collector_vfs, FileCollector};
pub use config::CollectorConfig;
pub use copy::{CopyFailure, CopyOutcome, CopyReport};
pub use error::{CollectorError, CollectorResult, FsError, FsResult};
pub use mapping::{MappingEntry, MappingWriter, OverlayMappingWriter, OverlayOptions};
pub use real_fs::RealFileSystem;
pub use types::*;
pub use vfs::CollectorFileSystem;
pub use walk::RecursiveDirectoryIter;
