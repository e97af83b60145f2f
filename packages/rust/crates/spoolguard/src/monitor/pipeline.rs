use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde_json::json;
use spoolguard_cancel::CancellationRequest;
use spoolguard_detect::JobDisposition;
use spoolguard_events::{SpoolEvent, sources, topics};
use spoolguard_types::{
    AttributeMap, CopyBasis, JobObservation, JobOperationKind, ObservationSource, QueueLocation,
};

use super::{Decision, Monitor, build_observation};
use crate::observability::MonitorEvent;

impl Monitor {
    /// Entry point for every event source.
    ///
    /// `Created` and `Modified` run detection (drivers often fill `Copies`
    /// and `TotalPages` after spooling); anything else is ignored.
    ///
    /// # Errors
    ///
    /// See [`Monitor::on_job_created`].
    pub fn on_job_operation(
        &self,
        attrs: &AttributeMap,
        kind: JobOperationKind,
        source: ObservationSource,
    ) -> anyhow::Result<Decision> {
        match kind {
            JobOperationKind::Created | JobOperationKind::Modified => {
                self.on_job_created(attrs, source)
            }
            JobOperationKind::Other => {
                tracing::trace!(source = source.as_str(), "ignoring job operation");
                Ok(Decision::Ignored)
            }
        }
    }

    /// Run detection for one raw record.
    ///
    /// # Errors
    ///
    /// The notifier failed. Any cancellation has already been queued by then.
    pub fn on_job_created(
        &self,
        attrs: &AttributeMap,
        source: ObservationSource,
    ) -> anyhow::Result<Decision> {
        let now = Utc::now();
        let mut observation = build_observation(attrs, source, now);
        let job_id = observation.job_id.clone();

        if let Some(disposition) = self.suppressor.disposition(&job_id) {
            tracing::debug!(
                event = MonitorEvent::DuplicateObservation.as_str(),
                job_id = %job_id,
                disposition = ?disposition,
                source = source.as_str(),
                "job already handled"
            );
            return Ok(match disposition {
                JobDisposition::Approved => Decision::Approved { job_id },
                JobDisposition::Claimed => Decision::AlreadyObserved { job_id },
            });
        }

        let corroboration = self.suppressor.corroborate(
            &job_id,
            &observation.signature(),
            observation.copies,
            now,
        );
        if corroboration.raised {
            tracing::info!(
                event = MonitorEvent::InferredCopies.as_str(),
                job_id = %job_id,
                old = observation.copies,
                new = corroboration.copies,
                basis = CopyBasis::RecentSignatures.as_str(),
                "copy count raised by recent sightings"
            );
            observation.copies = corroboration.copies;
            observation.copy_basis = CopyBasis::RecentSignatures;
        }

        if !observation.is_multi_copy() {
            tracing::trace!(job_id = %job_id, source = source.as_str(), "single-copy job");
            return Ok(Decision::Normal { job_id });
        }

        if self.markers.is_approved(&job_id) {
            self.accept_override(&job_id);
            self.queue_marker_cleanup(&job_id);
            return Ok(Decision::Approved { job_id });
        }

        if !self.suppressor.claim(&job_id) {
            return Ok(Decision::AlreadyObserved { job_id });
        }

        tracing::warn!(
            event = MonitorEvent::DetectedMultiCopyPrintJob.as_str(),
            job_id = %job_id,
            document = %observation.document,
            owner = %observation.owner,
            copies = observation.copies,
            basis = observation.copy_basis.as_str(),
            source = source.as_str(),
            "multi-copy print job detected"
        );
        self.bus.publish(SpoolEvent::job_event(
            sources::MONITOR,
            topics::JOB_DETECTED,
            &job_id,
            json!({
                "copies": observation.copies,
                "basis": observation.copy_basis.as_str(),
                "document": observation.document,
                "owner": observation.owner,
            }),
        ));

        let decision = self.dispatch(&observation, attrs);

        self.notifier
            .notify(&observation)
            .with_context(|| format!("notify user about job {job_id}"))?;
        tracing::info!(
            event = MonitorEvent::NotificationSent.as_str(),
            job_id = %job_id,
            "user notified"
        );
        Ok(decision)
    }

    /// Record an approval observed outside the pipeline (marker drop).
    pub fn accept_override(&self, job_id: &str) {
        self.suppressor.approve(job_id);
        tracing::info!(
            event = MonitorEvent::UserClickedOk.as_str(),
            job_id = %job_id,
            "override marker accepted"
        );
        self.bus.publish(SpoolEvent::job_event(
            sources::MONITOR,
            topics::JOB_APPROVED,
            job_id,
            json!({}),
        ));
    }

    /// Best-effort marker deletion through the work queue.
    pub fn queue_marker_cleanup(&self, job_id: &str) -> bool {
        let markers = self.markers.clone();
        let id = job_id.to_string();
        self.queue
            .enqueue(format!("consume marker {job_id}"), move || async move {
                markers
                    .consume(&id)
                    .with_context(|| format!("consume override marker for job {id}"))?;
                Ok(())
            })
    }

    fn dispatch(&self, observation: &JobObservation, attrs: &AttributeMap) -> Decision {
        let job_id = observation.job_id.clone();
        let copies = observation.copies;

        if is_network_job(observation) {
            if self.config.save_network_dumps {
                self.queue_dump(observation, attrs);
            }
            if !self.config.enable_network_cancellation {
                tracing::info!(
                    event = MonitorEvent::NetworkJobSkipped.as_str(),
                    job_id = %job_id,
                    host_queue = observation.host_queue.as_deref().unwrap_or_default(),
                    "network job left alone"
                );
                return Decision::NetworkSkipped { job_id, copies };
            }
        }

        if self.queue_cancellation(observation) {
            Decision::CancellationQueued { job_id, copies }
        } else {
            Decision::QueueClosed { job_id }
        }
    }

    fn queue_dump(&self, observation: &JobObservation, attrs: &AttributeMap) -> bool {
        let dumps = self.dumps.clone();
        let observation = observation.clone();
        let attrs = attrs.clone();
        self.queue.enqueue(
            format!("dump job {}", observation.job_id),
            move || async move {
                let path = dumps.write(&observation, &attrs)?;
                tracing::debug!(
                    event = MonitorEvent::NetworkDumpWritten.as_str(),
                    job_id = %observation.job_id,
                    path = %path.display(),
                    "network job dump written"
                );
                Ok(())
            },
        )
    }

    fn queue_cancellation(&self, observation: &JobObservation) -> bool {
        let request = CancellationRequest::from_observation(observation);
        let orchestrator = Arc::clone(&self.orchestrator);
        let suppressor = Arc::clone(&self.suppressor);
        let markers = self.markers.clone();
        let bus = self.bus.clone();

        self.queue.enqueue(
            format!("cancel job {}", request.job_id),
            move || async move {
                let job_id = request.job_id.as_str();
                if suppressor.is_approved(job_id) || markers.is_approved(job_id) {
                    suppressor.approve(job_id);
                    tracing::info!(
                        event = MonitorEvent::CancellationSkipped.as_str(),
                        job_id = %job_id,
                        "override marker present, cancellation skipped"
                    );
                    if let Err(error) = markers.consume(job_id) {
                        tracing::debug!(job_id = %job_id, error = %error, "marker cleanup failed");
                    }
                    bus.publish(SpoolEvent::job_event(
                        sources::MONITOR,
                        topics::JOB_APPROVED,
                        job_id,
                        json!({}),
                    ));
                    return Ok(());
                }

                let outcome = orchestrator.cancel(&request).await;
                if outcome.cancelled {
                    tracing::info!(
                        event = MonitorEvent::JobCancelled.as_str(),
                        job_id = %job_id,
                        outcome = outcome.label(),
                        steps = outcome.steps_run(),
                        "job cancelled"
                    );
                } else {
                    tracing::warn!(
                        event = MonitorEvent::JobCancelled.as_str(),
                        job_id = %job_id,
                        outcome = outcome.label(),
                        steps = outcome.steps_run(),
                        "job could not be cancelled"
                    );
                }
                bus.publish(SpoolEvent::job_event(
                    sources::MONITOR,
                    topics::JOB_CANCELLED,
                    job_id,
                    json!({ "cancelled": outcome.cancelled, "outcome": outcome.label() }),
                ));
                Ok(())
            },
        )
    }
}

/// Whether the job is hosted on a remote print server.
fn is_network_job(observation: &JobObservation) -> bool {
    observation
        .host_queue
        .as_deref()
        .is_some_and(|host| QueueLocation::parse(host).is_network())
        || observation.queue_name.trim_start().starts_with("\\\\")
}
