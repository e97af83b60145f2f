//! Cross-channel duplicate suppression.
//!
//! Two independent structures:
//!
//! - per-signature sliding windows of sighting timestamps, whose size is both
//!   a duplicate indicator and a corroborating copy-count signal;
//! - a permanent job-id table recording whether a job was already claimed by
//!   the pipeline or approved by the user.
//!
//! Both are lock-striped maps so feed, poll and watcher callbacks can record
//! concurrently without a pipeline-wide lock.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use spoolguard_types::JobSignature;

/// Default signature window.
pub const DEFAULT_SIGNATURE_WINDOW: Duration = Duration::from_secs(10);

/// Result of recording a sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureCheck {
    /// The signature was already seen inside the window.
    pub is_duplicate: bool,
    /// Sightings inside the window, this one included.
    pub recent_count: u32,
}

/// Copy count after checking it against recent sightings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corroboration {
    /// Window state after this sighting (zero count when not recorded).
    pub check: SignatureCheck,
    /// Copy count to act on.
    pub copies: u32,
    /// `copies` was raised above the inferred value.
    pub raised: bool,
}

/// What the pipeline already decided for a job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobDisposition {
    /// The pipeline took the job (detected and queued, or found normal).
    Claimed,
    /// The user approved the job; it must not be cancelled.
    Approved,
}

#[derive(Debug, Default)]
struct SignatureWindow {
    sightings: VecDeque<DateTime<Utc>>,
}

impl SignatureWindow {
    fn evict(&mut self, now: DateTime<Utc>, window: chrono::Duration) {
        while self
            .sightings
            .front()
            .is_some_and(|seen| now.signed_duration_since(*seen) > window)
        {
            self.sightings.pop_front();
        }
    }
}

/// Duplicate/signature suppressor, owned by one monitor run.
#[derive(Debug)]
pub struct DuplicateSuppressor {
    window: chrono::Duration,
    signatures: DashMap<JobSignature, SignatureWindow>,
    sighted: DashSet<String>,
    dispositions: DashMap<String, JobDisposition>,
}

impl Default for DuplicateSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE_WINDOW)
    }
}

impl DuplicateSuppressor {
    /// Create a suppressor with the given signature window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        Self {
            window,
            signatures: DashMap::new(),
            sighted: DashSet::new(),
            dispositions: DashMap::new(),
        }
    }

    /// Signature window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window.to_std().unwrap_or(Duration::MAX)
    }

    /// Record a sighting of `signature` at `now` and report the window state.
    pub fn should_process(&self, signature: &JobSignature, now: DateTime<Utc>) -> SignatureCheck {
        let mut entry = self.signatures.entry(signature.clone()).or_default();
        entry.sightings.push_back(now);
        entry.evict(now, self.window);
        let recent_count = u32::try_from(entry.sightings.len()).unwrap_or(u32::MAX);
        SignatureCheck {
            is_duplicate: recent_count > 1,
            recent_count,
        }
    }

    /// `true` exactly once per job id.
    ///
    /// Gates [`Self::should_process`] so one job reported by several channels
    /// does not inflate its own window.
    pub fn first_sighting(&self, job_id: &str) -> bool {
        self.sighted.insert(job_id.to_string())
    }

    /// Record the sighting when it is the job's first, and raise `inferred`
    /// to the window count when the window holds more sightings than that.
    pub fn corroborate(
        &self,
        job_id: &str,
        signature: &JobSignature,
        inferred: u32,
        now: DateTime<Utc>,
    ) -> Corroboration {
        if !self.first_sighting(job_id) {
            return Corroboration {
                check: SignatureCheck {
                    is_duplicate: true,
                    recent_count: 0,
                },
                copies: inferred,
                raised: false,
            };
        }
        let check = self.should_process(signature, now);
        let raised = check.recent_count > inferred;
        Corroboration {
            check,
            copies: if raised { check.recent_count } else { inferred },
            raised,
        }
    }

    /// Claim a job for the pipeline. Returns `false` when it already had a
    /// disposition.
    pub fn claim(&self, job_id: &str) -> bool {
        let mut inserted = false;
        self.dispositions
            .entry(job_id.to_string())
            .or_insert_with(|| {
                inserted = true;
                JobDisposition::Claimed
            });
        inserted
    }

    /// Mark a job approved; overrides any claim.
    pub fn approve(&self, job_id: &str) {
        self.dispositions
            .insert(job_id.to_string(), JobDisposition::Approved);
    }

    /// Current disposition of a job.
    #[must_use]
    pub fn disposition(&self, job_id: &str) -> Option<JobDisposition> {
        self.dispositions.get(job_id).map(|entry| *entry)
    }

    /// Whether the job was already claimed or approved.
    #[must_use]
    pub fn is_observed(&self, job_id: &str) -> bool {
        self.dispositions.contains_key(job_id)
    }

    /// Whether the job was approved.
    #[must_use]
    pub fn is_approved(&self, job_id: &str) -> bool {
        self.disposition(job_id) == Some(JobDisposition::Approved)
    }

    /// Drop signature windows whose sightings all aged out. Returns how many
    /// were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.signatures.len();
        self.signatures.retain(|_, window| {
            window.evict(now, self.window);
            !window.sightings.is_empty()
        });
        before.saturating_sub(self.signatures.len())
    }

    /// Number of tracked signatures.
    #[must_use]
    pub fn tracked_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Number of job ids with a disposition.
    #[must_use]
    pub fn tracked_jobs(&self) -> usize {
        self.dispositions.len()
    }
}
