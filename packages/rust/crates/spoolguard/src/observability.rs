//! Canonical event names for the diagnostics sink.
//!
//! Every record meant for log infrastructure carries `event = <name>` so
//! downstream filters do not depend on message text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    DetectedMultiCopyPrintJob,
    NotificationSent,
    UserClickedOk,
    JobCancelled,
    CancellationSkipped,
    InferredCopies,
    DuplicateObservation,
    NetworkJobSkipped,
    NetworkDumpWritten,
    FeedSubscriptionFailed,
    FeedDegraded,
    PollScanFailed,
    InboxJobRejected,
    HandlerFailed,
    ServiceStarted,
    ServiceStopping,
    ServiceCrashed,
}

impl MonitorEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DetectedMultiCopyPrintJob => "DetectedMultiCopyPrintJob",
            Self::NotificationSent => "NotificationSent",
            Self::UserClickedOk => "UserClickedOk",
            Self::JobCancelled => "JobCancelled",
            Self::CancellationSkipped => "CancellationSkipped",
            Self::InferredCopies => "InferredCopies",
            Self::DuplicateObservation => "DuplicateObservation",
            Self::NetworkJobSkipped => "NetworkJobSkipped",
            Self::NetworkDumpWritten => "NetworkDumpWritten",
            Self::FeedSubscriptionFailed => "FeedSubscriptionFailed",
            Self::FeedDegraded => "FeedDegraded",
            Self::PollScanFailed => "PollScanFailed",
            Self::InboxJobRejected => "InboxJobRejected",
            Self::HandlerFailed => "HandlerFailed",
            Self::ServiceStarted => "ServiceStarted",
            Self::ServiceStopping => "ServiceStopping",
            Self::ServiceCrashed => "ServiceCrashed",
        }
    }
}
