// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Tracing subscribers for programs embedding the collector
//!
//! Every event the collector emits lives under the [`COLLECTOR_TARGET`]
//! target: recorded paths at `debug`, swallowed tracking failures from the
//! intercepting wrapper at `debug`, skipped walk entries and copy failures
//! at `warn`. The helpers here show those events at a chosen level while
//! other crates stay at `warn`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::Subscriber;
use tracing_subscriber::{fmt, fmt::MakeWriter, layer::SubscriberExt, EnvFilter};

use crate::config::CollectorConfig;

pub use tracing::Level;

/// Target prefix of all collector events
pub const COLLECTOR_TARGET: &str = "agentfs_collector";

/// File name of the per-session log written next to the mapping
pub const SESSION_LOG_NAME: &str = "collector.log";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plaintext,
    /// One JSON object per event
    Json,
}

/// Collector events at `level`, everything else at `warn`. Ignores `RUST_LOG`.
pub fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!("warn,{COLLECTOR_TARGET}={level}"))
}

/// `RUST_LOG` when set, [`level_filter`] otherwise
pub fn collector_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level))
}

/// Build a subscriber writing collector events to `writer`.
///
/// Not installed globally; pass it to `tracing::subscriber::with_default`
/// to observe one collection, or to [`init`]-style helpers.
pub fn collector_subscriber<W>(
    filter: EnvFilter,
    format: LogFormat,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => Box::new(registry.with(fmt::layer().json().with_writer(writer))),
        LogFormat::Plaintext => {
            Box::new(registry.with(fmt::layer().with_ansi(false).with_writer(writer)))
        }
    }
}

/// Install a global subscriber logging to stderr
pub fn init(level: Level, format: LogFormat) -> anyhow::Result<()> {
    let subscriber = collector_subscriber(collector_filter(level), format, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber)
        .context("installing collector log subscriber")
}

/// Where [`init_session_log`] writes for `config`
pub fn session_log_path(config: &CollectorConfig) -> PathBuf {
    config.overlay_root.join(SESSION_LOG_NAME)
}

/// Install a global subscriber appending to the session log under the
/// overlay root, creating the overlay root if needed. Returns the log path.
pub fn init_session_log(
    config: &CollectorConfig,
    level: Level,
    format: LogFormat,
) -> anyhow::Result<PathBuf> {
    let log_path = session_log_path(config);
    let log_file = open_append(&log_path)?;
    let subscriber = collector_subscriber(collector_filter(level), format, Mutex::new(log_file));
    tracing::subscriber::set_global_default(subscriber)
        .context("installing collector log subscriber")?;
    Ok(log_path)
}

fn open_append(log_path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening session log {}", log_path.display()))
}
