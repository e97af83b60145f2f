//! Topic names. Grouped by prefix: `job/` from the pipeline, `marker/` and
//! `inbox/` from the drop watcher, `system/` from the service.

/// Multi-copy job detected (`job_id`, `copies`, `basis`, `document`, `owner`).
pub const JOB_DETECTED: &str = "job/detected";
/// Cancellation attempt finished (`job_id`, `cancelled`, `outcome`).
pub const JOB_CANCELLED: &str = "job/cancelled";
/// Job let through because the user approved it (`job_id`).
pub const JOB_APPROVED: &str = "job/approved";

/// Override marker file appeared (`job_id`, `path`).
pub const MARKER_APPROVED: &str = "marker/approved";
/// Simulated job file dropped into the inbox (`path`).
pub const INBOX_JOB: &str = "inbox/job";

/// Service started (`degraded`).
pub const SYSTEM_READY: &str = "system/ready";
/// Service stopping.
pub const SYSTEM_SHUTDOWN: &str = "system/shutdown";

/// Topics the drop watcher publishes.
pub const DROP_TOPICS: &[&str] = &[MARKER_APPROVED, INBOX_JOB];

/// Every topic, for iteration.
pub const ALL: &[&str] = &[
    JOB_DETECTED,
    JOB_CANCELLED,
    JOB_APPROVED,
    MARKER_APPROVED,
    INBOX_JOB,
    SYSTEM_READY,
    SYSTEM_SHUTDOWN,
];
