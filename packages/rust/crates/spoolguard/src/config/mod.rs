//! Config namespace: settings files and the resolved monitor configuration.

mod monitor;
mod settings;

pub use monitor::{
    DEFAULT_DEGRADED_WARNING_SECS, DEFAULT_JOB_AGE_THRESHOLD_SECS, DEFAULT_SCAN_INTERVAL_SECS,
    DEFAULT_SIGNATURE_WINDOW_SECS, DataLayout, Language, MonitorConfig,
};
pub use settings::{
    DATA_DIR_ENV, PrintMonitorSettings, RuntimeSettings, SYSTEM_SETTINGS_FILE,
    load_runtime_settings, load_runtime_settings_from_paths, resolve_data_dir,
};
