//! Attribute bag → [`JobObservation`].

use chrono::{DateTime, Utc};
use spoolguard_detect::{CopyInference, InferenceContext, resolve};
use spoolguard_types::{AttributeSource, JobObservation, ObservationSource, fields};

/// Normalize one raw record. Never fails.
///
/// A generated id is replaced by a separately reported `JobId` when there is
/// one; `Owner` falls back to `Notify`.
pub fn build_observation(
    attrs: &impl AttributeSource,
    source: ObservationSource,
    now: DateTime<Utc>,
) -> JobObservation {
    let raw_name = attrs.text(fields::NAME);
    let mut identity = resolve(raw_name.as_deref());
    if identity.generated
        && let Ok(Some(job_id)) = attrs.integer(fields::JOB_ID)
        && job_id > 0
    {
        identity.job_id = job_id.to_string();
        identity.generated = false;
    }

    let mut context = InferenceContext::from_identity(&identity);
    if context.job_id.is_none() {
        context.job_id = attrs
            .integer(fields::JOB_ID)
            .ok()
            .flatten()
            .and_then(|id| u32::try_from(id).ok());
    }
    let inference = CopyInference::infer(attrs, &context);

    JobObservation {
        raw_name,
        job_id: identity.job_id,
        queue_name: identity.queue_name,
        document: attrs.text(fields::DOCUMENT).unwrap_or_default(),
        owner: attrs
            .text(fields::OWNER)
            .or_else(|| attrs.text(fields::NOTIFY))
            .unwrap_or_default(),
        native_path: attrs.text(fields::NATIVE_PATH),
        host_queue: attrs.text(fields::HOST_PRINT_QUEUE),
        copies: inference.copies,
        copy_basis: inference.basis,
        source,
        observed_at_utc: now,
    }
}

#[cfg(test)]
mod tests {
    use spoolguard_types::{AttributeMap, CopyBasis};

    use super::*;

    #[test]
    fn test_composite_name() {
        let attrs = AttributeMap::new()
            .with("Name", "Shared, 55")
            .with("Copies", 5)
            .with("Document", "report.pdf")
            .with("Notify", "mrossi");
        let obs = build_observation(&attrs, ObservationSource::Feed, Utc::now());
        assert_eq!(obs.job_id, "55");
        assert_eq!(obs.queue_name, "Shared");
        assert_eq!(obs.owner, "mrossi");
        assert_eq!(obs.copies, 5);
        assert_eq!(obs.copy_basis, CopyBasis::Explicit);
    }

    #[test]
    fn test_job_id_attribute_replaces_generated_id() {
        let attrs = AttributeMap::new().with("JobId", 9).with("Copies", 9);
        let obs = build_observation(&attrs, ObservationSource::Poll, Utc::now());
        assert_eq!(obs.job_id, "9");
        // Copies equal to the id is a leaked id, not a count.
        assert_eq!(obs.copies, 1);
    }

    #[test]
    fn test_empty_bag() {
        let obs = build_observation(&AttributeMap::new(), ObservationSource::Simulated, Utc::now());
        assert!(!obs.job_id.is_empty());
        assert_eq!(obs.copies, 1);
        assert_eq!(obs.copy_basis, CopyBasis::Default);
    }
}
