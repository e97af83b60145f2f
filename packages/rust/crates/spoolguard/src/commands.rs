//! One-shot CLI operations against the data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use spoolguard_detect::{CopyInference, InferenceContext, resolve};
use spoolguard_types::{AttributeMap, AttributeSource, fields};
use spoolguard_watch::OverrideStore;
use uuid::Uuid;

use crate::config::DataLayout;

/// Write the override marker for `job_id`.
///
/// # Errors
///
/// Invalid id or the marker cannot be written.
pub fn approve_job(layout: &DataLayout, job_id: &str) -> anyhow::Result<PathBuf> {
    OverrideStore::new(layout.responses_dir())
        .approve(job_id)
        .with_context(|| format!("approve job {job_id}"))
}

/// A simulated job to drop into the inbox.
#[derive(Debug, Clone, Default)]
pub struct SimulatedJobSpec {
    pub queue: String,
    pub job_id: u32,
    pub copies: Option<u32>,
    pub total_pages: Option<u32>,
    pub document: Option<String>,
    pub owner: Option<String>,
    pub host_queue: Option<String>,
    pub ticket: Option<String>,
}

impl SimulatedJobSpec {
    /// Attribute bag as a spooler would report it.
    #[must_use]
    pub fn to_attributes(&self) -> AttributeMap {
        let mut attrs =
            AttributeMap::new().with(fields::NAME, format!("{}, {}", self.queue, self.job_id));
        if let Some(copies) = self.copies {
            attrs.insert(fields::COPIES, copies);
        }
        if let Some(total_pages) = self.total_pages {
            attrs.insert(fields::TOTAL_PAGES, total_pages);
        }
        if let Some(document) = &self.document {
            attrs.insert(fields::DOCUMENT, document.as_str());
        }
        if let Some(owner) = &self.owner {
            attrs.insert(fields::OWNER, owner.as_str());
        }
        if let Some(host_queue) = &self.host_queue {
            attrs.insert(fields::HOST_PRINT_QUEUE, host_queue.as_str());
        }
        if let Some(ticket) = &self.ticket {
            attrs.insert(fields::TICKET_CANDIDATES[0], ticket.as_str());
        }
        attrs
    }
}

/// Drop a simulated job into the inbox.
///
/// Writes `<uuid>.json.tmp` and renames it, so the watcher never sees a
/// partial file.
///
/// # Errors
///
/// The inbox cannot be created or written.
pub fn write_simulated_job(layout: &DataLayout, spec: &SimulatedJobSpec) -> anyhow::Result<PathBuf> {
    let inbox = layout.inbox_dir();
    std::fs::create_dir_all(&inbox)
        .with_context(|| format!("create inbox {}", inbox.display()))?;
    let name = Uuid::new_v4();
    let staging = inbox.join(format!("{name}.json.tmp"));
    let target = inbox.join(format!("{name}.json"));
    let body = serde_json::to_string_pretty(&spec.to_attributes())
        .context("serialize simulated job")?;
    std::fs::write(&staging, body)
        .with_context(|| format!("write {}", staging.display()))?;
    std::fs::rename(&staging, &target)
        .with_context(|| format!("move {} into the inbox", staging.display()))?;
    Ok(target)
}

/// Result of `spoolguard infer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferReport {
    pub job_id: String,
    pub queue_name: String,
    pub copies: u32,
    pub basis: &'static str,
}

/// Run identity resolution and copy inference over a JSON fixture.
///
/// # Errors
///
/// The file cannot be read or is not a JSON object.
pub fn infer_file(path: &Path) -> anyhow::Result<InferReport> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    anyhow::ensure!(value.is_object(), "{} is not a JSON object", path.display());
    let attrs = AttributeMap::from_json(value);
    Ok(infer_attributes(&attrs))
}

/// Inference over an in-memory bag.
#[must_use]
pub fn infer_attributes(attrs: &AttributeMap) -> InferReport {
    let identity = resolve(attrs.text(fields::NAME).as_deref());
    let inference = CopyInference::infer(attrs, &InferenceContext::from_attributes(attrs));
    InferReport {
        job_id: identity.job_id,
        queue_name: identity.queue_name,
        copies: inference.copies,
        basis: inference.basis.as_str(),
    }
}
