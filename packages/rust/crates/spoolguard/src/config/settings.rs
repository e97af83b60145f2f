//! Settings loader for the monitor.
//!
//! Loads and merges:
//! - System settings: `<data_dir>/config.json`
//! - User overrides:  the file given with `--config`
//!
//! Merge precedence is user over system, field by field. Missing, unreadable
//! or malformed files are logged and treated as empty.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name of the system settings inside the data directory.
pub const SYSTEM_SETTINGS_FILE: &str = "config.json";
/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "SPOOLGUARD_HOME";
const DEFAULT_DATA_DIR: &str = ".spoolguard";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuntimeSettings {
    pub language: Option<String>,
    #[serde(default)]
    pub print_monitor: PrintMonitorSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrintMonitorSettings {
    pub enable_scanner_in_service: Option<bool>,
    pub save_network_dumps: Option<bool>,
    pub enable_network_cancellation: Option<bool>,
    pub scan_interval_seconds: Option<u64>,
    pub job_age_threshold_seconds: Option<u64>,
    pub signature_window_seconds: Option<u64>,
    pub degraded_warning_seconds: Option<u64>,
}

impl RuntimeSettings {
    /// Layer `overlay` over `self`; fields set in `overlay` win.
    #[must_use]
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            language: overlay.language.or(self.language),
            print_monitor: self.print_monitor.merge(overlay.print_monitor),
        }
    }
}

impl PrintMonitorSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            enable_scanner_in_service: overlay
                .enable_scanner_in_service
                .or(self.enable_scanner_in_service),
            save_network_dumps: overlay.save_network_dumps.or(self.save_network_dumps),
            enable_network_cancellation: overlay
                .enable_network_cancellation
                .or(self.enable_network_cancellation),
            scan_interval_seconds: overlay
                .scan_interval_seconds
                .or(self.scan_interval_seconds),
            job_age_threshold_seconds: overlay
                .job_age_threshold_seconds
                .or(self.job_age_threshold_seconds),
            signature_window_seconds: overlay
                .signature_window_seconds
                .or(self.signature_window_seconds),
            degraded_warning_seconds: overlay
                .degraded_warning_seconds
                .or(self.degraded_warning_seconds),
        }
    }
}

/// Load system settings from `data_dir` and merge the optional user file.
pub fn load_runtime_settings(data_dir: &Path, user: Option<&Path>) -> RuntimeSettings {
    let system = load_one(&data_dir.join(SYSTEM_SETTINGS_FILE));
    match user {
        Some(user) => system.merge(load_one(user)),
        None => system,
    }
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_json::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings json; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

/// Resolve the data directory: explicit flag, then `$SPOOLGUARD_HOME`, then
/// `./.spoolguard`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| {
            std::env::var(DATA_DIR_ENV)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
