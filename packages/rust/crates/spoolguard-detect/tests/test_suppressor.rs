//! Duplicate suppressor tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use spoolguard_detect::{DEFAULT_SIGNATURE_WINDOW, DuplicateSuppressor, JobDisposition};
use spoolguard_types::JobSignature;

fn signature() -> JobSignature {
    JobSignature::new("Office", "report.pdf", "mrossi")
}

#[test]
fn test_default_window() {
    assert_eq!(DuplicateSuppressor::default().window(), DEFAULT_SIGNATURE_WINDOW);
}

#[test]
fn test_three_sightings_then_aged_out() {
    let suppressor = DuplicateSuppressor::new(Duration::from_secs(10));
    let start = Utc::now();

    let first = suppressor.should_process(&signature(), start);
    assert_eq!(first.recent_count, 1);
    assert!(!first.is_duplicate);

    suppressor.should_process(&signature(), start + TimeDelta::seconds(2));
    let third = suppressor.should_process(&signature(), start + TimeDelta::seconds(4));
    assert_eq!(third.recent_count, 3);
    assert!(third.is_duplicate);

    let fourth = suppressor.should_process(&signature(), start + TimeDelta::seconds(30));
    assert_eq!(fourth.recent_count, 1);
    assert!(!fourth.is_duplicate);
}

#[test]
fn test_signatures_are_independent() {
    let suppressor = DuplicateSuppressor::default();
    let now = Utc::now();
    suppressor.should_process(&signature(), now);
    let other = JobSignature::new("Office", "other.pdf", "mrossi");
    assert_eq!(suppressor.should_process(&other, now).recent_count, 1);
    assert_eq!(suppressor.tracked_signatures(), 2);
}

#[test]
fn test_corroboration_raises_copies() {
    let suppressor = DuplicateSuppressor::default();
    let now = Utc::now();
    let first = suppressor.corroborate("10", &signature(), 1, now);
    assert!(!first.raised);
    assert_eq!(first.copies, 1);

    let second = suppressor.corroborate("11", &signature(), 1, now + TimeDelta::seconds(1));
    assert!(second.raised);
    assert_eq!(second.copies, 2);
    assert_eq!(second.check.recent_count, 2);
}

#[test]
fn test_corroboration_keeps_higher_inferred_count() {
    let suppressor = DuplicateSuppressor::default();
    let now = Utc::now();
    suppressor.corroborate("10", &signature(), 5, now);
    let second = suppressor.corroborate("11", &signature(), 5, now);
    assert!(!second.raised);
    assert_eq!(second.copies, 5);
}

#[test]
fn test_same_job_id_counts_once() {
    let suppressor = DuplicateSuppressor::default();
    let now = Utc::now();
    let push = suppressor.corroborate("55", &signature(), 1, now);
    let poll = suppressor.corroborate("55", &signature(), 1, now + TimeDelta::seconds(1));
    assert_eq!(push.check.recent_count, 1);
    assert!(!poll.raised);
    assert_eq!(poll.copies, 1);
    assert_eq!(poll.check.recent_count, 0);
}

#[test]
fn test_dispositions() {
    let suppressor = DuplicateSuppressor::default();
    assert!(!suppressor.is_observed("7"));
    assert!(suppressor.claim("7"));
    assert!(!suppressor.claim("7"));
    assert_eq!(suppressor.disposition("7"), Some(JobDisposition::Claimed));

    suppressor.approve("7");
    assert!(suppressor.is_approved("7"));
    assert!(!suppressor.claim("7"));
    assert_eq!(suppressor.disposition("7"), Some(JobDisposition::Approved));
    assert_eq!(suppressor.tracked_jobs(), 1);
}

#[test]
fn test_sweep_drops_stale_windows() {
    let suppressor = DuplicateSuppressor::new(Duration::from_secs(5));
    let start = Utc::now();
    suppressor.should_process(&signature(), start);
    suppressor.should_process(
        &JobSignature::new("Office", "fresh.pdf", ""),
        start + TimeDelta::seconds(20),
    );
    assert_eq!(suppressor.sweep(start + TimeDelta::seconds(21)), 1);
    assert_eq!(suppressor.tracked_signatures(), 1);
}

#[test]
fn test_concurrent_claims_yield_single_winner() {
    let suppressor = Arc::new(DuplicateSuppressor::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let suppressor = Arc::clone(&suppressor);
            std::thread::spawn(move || suppressor.claim("99"))
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}
