//! Resolved monitor configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::settings::RuntimeSettings;

pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_JOB_AGE_THRESHOLD_SECS: u64 = 30;
pub const DEFAULT_SIGNATURE_WINDOW_SECS: u64 = 10;
pub const DEFAULT_DEGRADED_WARNING_SECS: u64 = 300;

/// Notification language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Italian,
    English,
}

impl Language {
    /// Parse a language tag; anything unknown falls back to Italian.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()) {
            Some(tag) if tag == "en" || tag.starts_with("en-") => Self::English,
            _ => Self::Italian,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Italian => "it",
            Self::English => "en",
        }
    }
}

/// Filesystem layout under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Override markers (`<jobId>.ok`).
    #[must_use]
    pub fn responses_dir(&self) -> PathBuf {
        self.root.join("responses")
    }

    /// Simulated job drops (`*.json`).
    #[must_use]
    pub fn inbox_dir(&self) -> PathBuf {
        self.root.join("inbox")
    }

    /// Diagnostic dumps.
    #[must_use]
    pub fn dumps_dir(&self) -> PathBuf {
        self.root.join("dumps")
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Everything the monitor needs, with defaults and lower bounds applied.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub layout: DataLayout,
    pub language: Language,
    pub enable_scanner: bool,
    pub save_network_dumps: bool,
    pub enable_network_cancellation: bool,
    pub scan_interval: Duration,
    pub job_age_threshold: Duration,
    pub signature_window: Duration,
    pub degraded_warning_interval: Duration,
}

impl MonitorConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::from_settings(data_dir, &RuntimeSettings::default())
    }

    /// Apply settings over the defaults.
    pub fn from_settings(data_dir: impl Into<PathBuf>, settings: &RuntimeSettings) -> Self {
        let pm = &settings.print_monitor;
        Self {
            layout: DataLayout::new(data_dir),
            language: Language::from_tag(settings.language.as_deref()),
            enable_scanner: pm.enable_scanner_in_service.unwrap_or(true),
            save_network_dumps: pm.save_network_dumps.unwrap_or(true),
            enable_network_cancellation: pm.enable_network_cancellation.unwrap_or(false),
            scan_interval: secs_at_least_one(pm.scan_interval_seconds, DEFAULT_SCAN_INTERVAL_SECS),
            job_age_threshold: Duration::from_secs(
                pm.job_age_threshold_seconds
                    .unwrap_or(DEFAULT_JOB_AGE_THRESHOLD_SECS),
            ),
            signature_window: secs_at_least_one(
                pm.signature_window_seconds,
                DEFAULT_SIGNATURE_WINDOW_SECS,
            ),
            degraded_warning_interval: secs_at_least_one(
                pm.degraded_warning_seconds,
                DEFAULT_DEGRADED_WARNING_SECS,
            ),
        }
    }
}

fn secs_at_least_one(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.unwrap_or(default).max(1))
}
