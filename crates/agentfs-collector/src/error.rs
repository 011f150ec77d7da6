// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the file collector

use std::io;
use std::path::PathBuf;

/// Error returned by a [`FileSystem`](crate::FileSystem) capability
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("access denied")]
    AccessDenied,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported")]
    Unsupported,
}

impl FsError {
    /// Map an `io::Error` onto the closest variant, keeping the raw error otherwise.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::PermissionDenied => FsError::AccessDenied,
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists,
            _ => FsError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound => true,
            FsError::Io(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;

/// Error returned by the collector's top-level operations
#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    /// A path could not be canonicalized (missing, permission denied, broken link)
    #[error("cannot resolve real path of {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    /// A directory could not be listed during a recursive walk
    #[error("cannot enumerate directory {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    /// The mapping file could not be opened or written
    #[error("cannot write mapping file {path}: {source}")]
    MappingWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The rendered mapping could not be written to a caller-supplied writer
    #[error("cannot write mapping output: {0}")]
    MappingOutput(#[source] io::Error),
    /// The mapping document could not be encoded
    #[error("cannot encode mapping: {0}")]
    MappingEncode(#[from] serde_yaml::Error),
    /// An entry could not be copied into the root directory
    #[error("cannot copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

impl CollectorError {
    /// Path the error refers to, when there is one
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            CollectorError::PathResolution { path, .. }
            | CollectorError::Enumeration { path, .. }
            | CollectorError::MappingWrite { path, .. }
            | CollectorError::Copy { path, .. } => Some(path),
            CollectorError::MappingOutput(_) | CollectorError::MappingEncode(_) => None,
        }
    }
}

pub type CollectorResult<T> = Result<T, CollectorError>;
