//! CLI operations on the data directory.

use spoolguard::{
    DataLayout, SimulatedJobSpec, approve_job, infer_attributes, infer_file, write_simulated_job,
};
use spoolguard_types::{AttributeMap, AttributeSource};
use tempfile::TempDir;

#[test]
fn test_approve_writes_marker() {
    let tmp = TempDir::new().unwrap();
    let layout = DataLayout::new(tmp.path());
    let path = approve_job(&layout, "55").unwrap();
    assert_eq!(path, layout.responses_dir().join("55.ok"));
    assert!(path.is_file());
}

#[test]
fn test_approve_rejects_path_like_ids() {
    let tmp = TempDir::new().unwrap();
    let layout = DataLayout::new(tmp.path());
    assert!(approve_job(&layout, "../55").is_err());
}

#[test]
fn test_simulated_job_lands_in_inbox() {
    let tmp = TempDir::new().unwrap();
    let layout = DataLayout::new(tmp.path());
    let spec = SimulatedJobSpec {
        queue: "Shared".to_string(),
        job_id: 55,
        copies: Some(5),
        owner: Some("mrossi".to_string()),
        ..SimulatedJobSpec::default()
    };

    let path = write_simulated_job(&layout, &spec).unwrap();
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    let leftovers: Vec<_> = std::fs::read_dir(layout.inbox_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let attrs = AttributeMap::from_json(value);
    assert_eq!(attrs.text("Name").as_deref(), Some("Shared, 55"));
    assert_eq!(attrs.integer("Copies"), Ok(Some(5)));
    assert_eq!(attrs.text("Owner").as_deref(), Some("mrossi"));
}

#[test]
fn test_infer_file() {
    let tmp = TempDir::new().unwrap();
    let fixture = tmp.path().join("job.json");
    std::fs::write(
        &fixture,
        r#"{"Name": "Floor2, 12", "TotalPages": 21, "Pages": 4}"#,
    )
    .unwrap();

    let report = infer_file(&fixture).unwrap();
    assert_eq!(report.job_id, "12");
    assert_eq!(report.queue_name, "Floor2");
    assert_eq!(report.copies, 6);
    assert_eq!(report.basis, "page_ratio");
}

#[test]
fn test_infer_rejects_non_object() {
    let tmp = TempDir::new().unwrap();
    let fixture = tmp.path().join("job.json");
    std::fs::write(&fixture, "[1, 2]").unwrap();
    assert!(infer_file(&fixture).is_err());
}

#[test]
fn test_infer_ticket_from_simulated_job() {
    let spec = SimulatedJobSpec {
        queue: "Office".to_string(),
        job_id: 3,
        ticket: Some("<psf:JobCopies> 7 </psf:JobCopies>".to_string()),
        ..SimulatedJobSpec::default()
    };
    let report = infer_attributes(&spec.to_attributes());
    assert_eq!(report.copies, 7);
    assert_eq!(report.basis, "ticket");
}
