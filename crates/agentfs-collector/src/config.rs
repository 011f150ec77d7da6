// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Collector configuration loaded from TOML with an environment overlay

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables overriding file settings,
/// e.g. `AGENTFS_COLLECTOR_STOP_ON_ERROR=false`
pub const ENV_PREFIX: &str = "AGENTFS_COLLECTOR";

/// Settings for one collection session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectorConfig {
    /// Directory files are copied into
    pub root: PathBuf,
    /// Directory the emitted mapping is expressed relative to
    pub overlay_root: PathBuf,
    #[serde(default = "default_true")]
    pub stop_on_error: bool,
    /// Skip probing the overlay root and force this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default = "default_true")]
    pub overlay_relative: bool,
    #[serde(default)]
    pub use_external_names: bool,
}

fn default_true() -> bool {
    true
}

impl CollectorConfig {
    pub fn new(root: impl Into<PathBuf>, overlay_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overlay_root: overlay_root.into(),
            stop_on_error: true,
            case_sensitive: None,
            overlay_relative: true,
            use_external_names: false,
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("parsing collector config")
    }

    /// Read a TOML file and apply `AGENTFS_COLLECTOR_*` overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading collector config {:?}", path))?;
        Self::from_toml_str(&content)?.with_env_overlay()
    }

    /// Apply `AGENTFS_COLLECTOR_*` environment variables on top of `self`.
    /// `AGENTFS_COLLECTOR_OVERLAY_ROOT` maps to `overlay-root`.
    pub fn with_env_overlay(self) -> Result<Self> {
        let base = toml::to_string(&self).context("serializing collector config")?;
        let built = config::Config::builder()
            .add_source(config::File::from_str(&base, config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .convert_case(config::Case::Kebab)
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize().context("applying collector environment overrides")
    }
}
