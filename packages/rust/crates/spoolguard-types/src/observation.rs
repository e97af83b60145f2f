//! Job observation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which channel produced an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    /// Push-style job creation/modification feed.
    Feed,
    /// Periodic queue enumeration.
    Poll,
    /// Simulated injection (file drop or test).
    Simulated,
}

impl ObservationSource {
    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Poll => "poll",
            Self::Simulated => "simulated",
        }
    }
}

/// Kind of spooler operation reported by an event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOperationKind {
    /// Job was created.
    Created,
    /// Job attributes changed.
    Modified,
    /// Anything else (deletion, pause, ...).
    Other,
}

/// Strategy that produced a copy count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyBasis {
    /// `Copies` field.
    Explicit,
    /// `ceil(TotalPages / per-document pages)`.
    PageRatio,
    /// `TotalPages` alone.
    TotalPages,
    /// Embedded print ticket.
    Ticket,
    /// Multiplicity marker in a descriptive name.
    NameHint,
    /// Raised to the number of recent sightings of the same signature.
    RecentSignatures,
    /// No signal; normal single-copy job.
    Default,
}

impl CopyBasis {
    /// Stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::PageRatio => "page_ratio",
            Self::TotalPages => "total_pages",
            Self::Ticket => "ticket",
            Self::NameHint => "name_hint",
            Self::RecentSignatures => "recent_signatures",
            Self::Default => "default",
        }
    }
}

/// Correlation key for independent sightings of what is probably the same
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobSignature {
    /// Queue name.
    pub queue: String,
    /// Document title.
    pub document: String,
    /// Submitting user.
    pub owner: String,
}

impl JobSignature {
    /// Create a signature.
    pub fn new(
        queue: impl Into<String>,
        document: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            queue: queue.into(),
            document: document.into(),
            owner: owner.into(),
        }
    }
}

impl std::fmt::Display for JobSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.queue, self.document, self.owner)
    }
}

/// One detected job event, normalized.
///
/// Built once per event and not mutated after its copy count is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobObservation {
    /// Vendor composite name, commonly `"<queue>, <id>"`.
    pub raw_name: Option<String>,
    /// Derived identifier; never empty.
    pub job_id: String,
    /// Derived queue identity; may be empty.
    pub queue_name: String,
    /// Document title; may be empty.
    pub document: String,
    /// Submitting user; may be empty.
    pub owner: String,
    /// Opaque native locator for direct deletion.
    pub native_path: Option<String>,
    /// Host queue as reported (`\\server\printer` or a printer name).
    pub host_queue: Option<String>,
    /// Resolved copy count; always at least 1.
    pub copies: u32,
    /// Strategy that produced `copies`.
    pub copy_basis: CopyBasis,
    /// Channel that produced this observation.
    pub source: ObservationSource,
    /// Observation time.
    pub observed_at_utc: DateTime<Utc>,
}

impl JobObservation {
    /// Signature used by the duplicate suppressor.
    #[must_use]
    pub fn signature(&self) -> JobSignature {
        JobSignature::new(
            self.queue_name.clone(),
            self.document.clone(),
            self.owner.clone(),
        )
    }

    /// Whether this job asks for more than one copy.
    #[must_use]
    pub fn is_multi_copy(&self) -> bool {
        self.copies > 1
    }

    /// Job id as an integer, when it is one.
    #[must_use]
    pub fn numeric_job_id(&self) -> Option<u32> {
        self.job_id.trim().parse().ok()
    }
}
