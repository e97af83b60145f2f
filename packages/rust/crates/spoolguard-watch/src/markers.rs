//! On-disk override markers.
//!
//! A marker is `<dir>/<job_id>.ok`. Its existence means the user approved the
//! job; the content (an RFC 3339 timestamp) is informational only.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::MarkerError;

/// Marker file extension, without the dot.
pub const MARKER_EXTENSION: &str = "ok";

/// Directory of override markers keyed by job id.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    dir: PathBuf,
}

impl OverrideStore {
    /// Store rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Marker directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the marker for `job_id`.
    ///
    /// # Errors
    ///
    /// [`MarkerError::InvalidJobId`] when the id is empty or would escape the
    /// marker directory.
    pub fn marker_path(&self, job_id: &str) -> Result<PathBuf, MarkerError> {
        let job_id = job_id.trim();
        if job_id.is_empty()
            || job_id == "."
            || job_id == ".."
            || job_id.contains(['/', '\\', ':', '\0'])
        {
            return Err(MarkerError::InvalidJobId(job_id.to_string()));
        }
        Ok(self.dir.join(format!("{job_id}.{MARKER_EXTENSION}")))
    }

    /// Write the marker for `job_id`.
    ///
    /// # Errors
    ///
    /// Invalid id, or the directory/file cannot be written.
    pub fn approve(&self, job_id: &str) -> Result<PathBuf, MarkerError> {
        let path = self.marker_path(job_id)?;
        fs::create_dir_all(&self.dir).map_err(|source| MarkerError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, Utc::now().to_rfc3339()).map_err(|source| MarkerError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Whether a marker exists for `job_id`. Invalid ids are never approved.
    #[must_use]
    pub fn is_approved(&self, job_id: &str) -> bool {
        self.marker_path(job_id)
            .is_ok_and(|path| path.is_file())
    }

    /// Delete the marker for `job_id`. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Invalid id, or removal failed for a reason other than absence.
    pub fn consume(&self, job_id: &str) -> Result<bool, MarkerError> {
        let path = self.marker_path(job_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(MarkerError::Io { path, source }),
        }
    }

    /// Job ids with a marker present.
    ///
    /// # Errors
    ///
    /// The directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>, MarkerError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(MarkerError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| Self::job_id_of(&entry.path()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Job id encoded in a marker path (`.../55.ok` → `55`).
    #[must_use]
    pub fn job_id_of(path: &Path) -> Option<String> {
        let is_marker = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKER_EXTENSION));
        if !is_marker {
            return None;
        }
        path.file_stem()
            .map(|stem| stem.to_string_lossy().trim().to_string())
            .filter(|stem| !stem.is_empty())
    }
}
