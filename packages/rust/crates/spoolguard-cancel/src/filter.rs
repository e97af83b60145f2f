//! Tolerant filter for the structured-query step.

use std::fmt;

use serde::{Deserialize, Serialize};
use spoolguard_types::QueueLocation;

use crate::provider::JobRecord;

/// Filter handed to [`crate::StructuredQuery::query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobFilter {
    /// `JobId = N`.
    ById(u32),
    /// Name/host-queue substring OR owner/notify match.
    Tolerant {
        /// Last `\` segment of the queue name.
        name_fragment: Option<String>,
        /// Submitting user.
        owner: Option<String>,
    },
}

impl JobFilter {
    /// Build the filter for a job. `None` when there is nothing to filter on.
    #[must_use]
    pub fn build(job_id: &str, queue_name: &str, owner: &str) -> Option<Self> {
        if let Ok(id) = job_id.trim().parse::<u32>() {
            return Some(Self::ById(id));
        }
        let name_fragment = non_empty(QueueLocation::last_segment(queue_name.trim()));
        let owner = non_empty(owner);
        if name_fragment.is_none() && owner.is_none() {
            return None;
        }
        Some(Self::Tolerant {
            name_fragment,
            owner,
        })
    }

    /// Whether a record satisfies the filter.
    #[must_use]
    pub fn matches(&self, record: &JobRecord) -> bool {
        match self {
            Self::ById(id) => record.job_id == Some(*id),
            Self::Tolerant {
                name_fragment,
                owner,
            } => {
                let by_name = name_fragment.as_deref().is_some_and(|fragment| {
                    contains_ignore_case(&record.name, fragment)
                        || contains_ignore_case(&record.host_queue, fragment)
                });
                let by_owner = owner.as_deref().is_some_and(|owner| {
                    record.owner.eq_ignore_ascii_case(owner)
                        || record.notify.eq_ignore_ascii_case(owner)
                        || contains_ignore_case(&record.name, owner)
                });
                by_name || by_owner
            }
        }
    }

    /// Whether a record is safe to delete: it satisfies the filter and, when
    /// only an owner identifies the job, belongs to that owner.
    #[must_use]
    pub fn is_consistent(&self, record: &JobRecord) -> bool {
        if !self.matches(record) {
            return false;
        }
        match self {
            Self::ById(_) => true,
            Self::Tolerant { owner: None, .. } => true,
            Self::Tolerant {
                owner: Some(owner), ..
            } => {
                record.owner.eq_ignore_ascii_case(owner) || record.notify.eq_ignore_ascii_case(owner)
            }
        }
    }
}

impl fmt::Display for JobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(id) => write!(f, "JobId = {id}"),
            Self::Tolerant {
                name_fragment,
                owner,
            } => {
                let mut clauses = Vec::new();
                if let Some(fragment) = name_fragment {
                    clauses.push(format!(
                        "Name LIKE '%{fragment}%' OR HostPrintQueue LIKE '%{fragment}%'"
                    ));
                }
                if let Some(owner) = owner {
                    clauses.push(format!(
                        "Owner = '{owner}' OR Notify = '{owner}' OR Name LIKE '%{owner}%'"
                    ));
                }
                f.write_str(&clauses.join(" OR "))
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}
