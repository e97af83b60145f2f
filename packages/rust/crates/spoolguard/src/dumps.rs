//! Diagnostic dumps for network jobs.
//!
//! One JSON file per job under `<data_dir>/dumps`, holding the observation
//! and the raw attributes it was built from. Written through the work queue.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde_json::json;
use spoolguard_types::{AttributeMap, JobObservation};

#[derive(Debug, Clone)]
pub struct DumpWriter {
    dir: PathBuf,
}

impl DumpWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a dump and return its path.
    ///
    /// # Errors
    ///
    /// The directory or file cannot be written.
    pub fn write(&self, observation: &JobObservation, attrs: &AttributeMap) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create dump dir {}", self.dir.display()))?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let path = self
            .dir
            .join(format!("{stamp}-{}.json", file_safe(&observation.job_id)));
        let body = json!({
            "observation": observation,
            "attributes": attrs,
        });
        let rendered = serde_json::to_string_pretty(&body).context("serialize dump")?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("write dump {}", path.display()))?;
        Ok(path)
    }
}

fn file_safe(job_id: &str) -> String {
    job_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
