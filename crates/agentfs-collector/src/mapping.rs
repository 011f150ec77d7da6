// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual to real path mapping and its overlay document writer
//!
//! The document follows the layout consumed by overlay-style virtual
//! filesystems: a list of roots, each a directory holding `file` and
//! `directory-remap` entries that point at `external-contents`.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CollectorResult;
use crate::FileSystem;

/// One recorded association between a virtual path and its copied counterpart
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    pub virtual_path: PathBuf,
    pub real_path: PathBuf,
    /// Decided once, at insertion time
    pub is_directory: bool,
}

/// Document-level settings applied when writing the mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Directory `external-contents` paths are expressed relative to
    pub overlay_dir: Option<PathBuf>,
    /// `None` lets the collector probe the overlay directory at write time
    pub case_sensitive: Option<bool>,
    pub use_external_names: bool,
    pub overlay_relative: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            overlay_dir: None,
            case_sensitive: None,
            use_external_names: false,
            overlay_relative: true,
        }
    }
}

/// Sink that accumulates mappings and serializes them on demand
pub trait MappingWriter: Send {
    fn add_file_mapping(&mut self, virtual_path: &Path, real_path: &Path);

    fn add_directory_mapping(&mut self, virtual_path: &Path, real_path: &Path);

    /// Every mapping recorded so far, in insertion order
    fn mappings(&self) -> &[MappingEntry];

    /// Serialize all mappings. Does not modify the accumulated state.
    fn write(&self, options: &OverlayOptions, out: &mut dyn io::Write) -> CollectorResult<()>;
}

/// [`MappingWriter`] emitting a YAML overlay document
#[derive(Debug, Default)]
pub struct OverlayMappingWriter {
    entries: Vec<MappingEntry>,
}

impl OverlayMappingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, virtual_path: &Path, real_path: &Path, is_directory: bool) {
        self.entries.push(MappingEntry {
            virtual_path: virtual_path.to_path_buf(),
            real_path: real_path.to_path_buf(),
            is_directory,
        });
    }

    fn build_document(&self, options: &OverlayOptions) -> OverlayDocument {
        let mut by_parent: BTreeMap<PathBuf, Vec<&MappingEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let parent = entry.virtual_path.parent().unwrap_or(&entry.virtual_path).to_path_buf();
            by_parent.entry(parent).or_default().push(entry);
        }

        let roots = by_parent
            .into_iter()
            .map(|(parent, mut entries)| {
                entries.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
                let contents = entries
                    .into_iter()
                    .map(|entry| {
                        let name = entry
                            .virtual_path
                            .file_name()
                            .map(|name| name.to_string_lossy().to_string())
                            .unwrap_or_else(|| entry.virtual_path.to_string_lossy().to_string());
                        let external_contents = external_contents(&entry.real_path, options);
                        if entry.is_directory {
                            OverlayNode::DirectoryRemap {
                                name,
                                external_contents,
                            }
                        } else {
                            OverlayNode::File {
                                name,
                                external_contents,
                            }
                        }
                    })
                    .collect();
                OverlayNode::Directory {
                    name: parent.to_string_lossy().to_string(),
                    contents,
                }
            })
            .collect();

        OverlayDocument {
            version: 0,
            case_sensitive: options.case_sensitive.unwrap_or(true),
            use_external_names: options.use_external_names,
            overlay_relative: options.overlay_relative && options.overlay_dir.is_some(),
            roots,
        }
    }
}

impl MappingWriter for OverlayMappingWriter {
    fn add_file_mapping(&mut self, virtual_path: &Path, real_path: &Path) {
        self.push(virtual_path, real_path, false);
    }

    fn add_directory_mapping(&mut self, virtual_path: &Path, real_path: &Path) {
        self.push(virtual_path, real_path, true);
    }

    fn mappings(&self) -> &[MappingEntry] {
        &self.entries
    }

    fn write(&self, options: &OverlayOptions, out: &mut dyn io::Write) -> CollectorResult<()> {
        let document = self.build_document(options);
        serde_yaml::to_writer(out, &document)?;
        Ok(())
    }
}

fn external_contents(real_path: &Path, options: &OverlayOptions) -> String {
    if options.overlay_relative {
        if let Some(relative) =
            options.overlay_dir.as_deref().and_then(|dir| real_path.strip_prefix(dir).ok())
        {
            return relative.to_string_lossy().to_string();
        }
    }
    real_path.to_string_lossy().to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct OverlayDocument {
    version: u32,
    case_sensitive: bool,
    use_external_names: bool,
    overlay_relative: bool,
    roots: Vec<OverlayNode>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum OverlayNode {
    Directory {
        name: String,
        contents: Vec<OverlayNode>,
    },
    File {
        name: String,
        #[serde(rename = "external-contents")]
        external_contents: String,
    },
    DirectoryRemap {
        name: String,
        #[serde(rename = "external-contents")]
        external_contents: String,
    },
}

/// Probe whether lookups under `path` are case sensitive.
///
/// The upper-cased spelling of the resolved path is resolved again; if it
/// lands on the same real path the tree is case-insensitive. Any resolution
/// failure counts as case-sensitive.
pub fn is_case_sensitive_path(fs: &dyn FileSystem, path: &Path) -> bool {
    let Ok(real) = fs.real_path(path) else {
        return true;
    };
    let upper = PathBuf::from(real.to_string_lossy().to_uppercase());
    if upper == real {
        return true;
    }
    match fs.real_path(&upper) {
        Ok(resolved) => resolved != real,
        Err(_) => true,
    }
}
