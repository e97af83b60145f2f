//! Copy-count inference tests.

use serde_json::json;
use spoolguard_detect::{
    CopyInference, InferError, Inference, InferenceContext, MAX_TOTAL_PAGES_AS_COPIES, Strategy,
    StrategyOutcome, infer_copies,
};
use spoolguard_types::{AttributeMap, CopyBasis};

fn attrs(value: serde_json::Value) -> AttributeMap {
    AttributeMap::from_json(value)
}

#[test]
fn test_empty_source_defaults_to_one() {
    assert_eq!(infer_copies(&AttributeMap::new()), 1);
    let inference = CopyInference::infer(&AttributeMap::new(), &InferenceContext::default());
    assert_eq!(inference, Inference::SINGLE);
}

#[test]
fn test_never_below_one() {
    let fixtures = [
        json!({"Copies": 0}),
        json!({"Copies": -4}),
        json!({"Copies": "lots"}),
        json!({"TotalPages": 0, "Pages": 0}),
        json!({"TotalPages": -10}),
        json!({"PrintTicket": "<JobCopies>0</JobCopies>"}),
        json!({"Name": "report (0 copies)"}),
        json!({"Name": null, "Copies": null}),
    ];
    for fixture in fixtures {
        assert!(infer_copies(&attrs(fixture.clone())) >= 1, "fixture = {fixture}");
    }
}

#[test]
fn test_explicit_copies() {
    let bag = attrs(json!({"Name": "Shared, 55", "Copies": 5}));
    let context = InferenceContext::from_attributes(&bag);
    let inference = CopyInference::infer(&bag, &context);
    assert_eq!(inference.copies, 5);
    assert_eq!(inference.basis, CopyBasis::Explicit);
}

#[test]
fn test_explicit_copies_from_string() {
    assert_eq!(infer_copies(&attrs(json!({"Copies": " 3 "}))), 3);
}

#[test]
fn test_copies_equal_to_job_id_is_skipped() {
    let bag = attrs(json!({"Name": "Office, 42", "Copies": 42}));
    assert_eq!(infer_copies(&bag), 1);

    let bag = attrs(json!({"Name": "Office, 42", "Copies": 42, "TotalPages": 3}));
    let inference = CopyInference::infer(&bag, &InferenceContext::from_attributes(&bag));
    assert_eq!(inference.copies, 3);
    assert_eq!(inference.basis, CopyBasis::TotalPages);
}

#[test]
fn test_copies_equal_to_job_id_field_is_skipped() {
    let bag = attrs(json!({"Name": "minutes.docx", "JobId": 9, "Copies": 9}));
    assert_eq!(infer_copies(&bag), 1);
}

#[test]
fn test_page_ratio_exact_and_rounded_up() {
    assert_eq!(infer_copies(&attrs(json!({"TotalPages": 20, "Pages": 4}))), 5);
    assert_eq!(infer_copies(&attrs(json!({"TotalPages": 21, "Pages": 4}))), 6);
}

#[test]
fn test_page_ratio_uses_first_positive_candidate() {
    let bag = attrs(json!({"TotalPages": 12, "Pages": 0, "NumberOfPages": "x", "PageCount": 3}));
    let inference = CopyInference::infer(&bag, &InferenceContext::default());
    assert_eq!(inference.copies, 4);
    assert_eq!(inference.basis, CopyBasis::PageRatio);
}

#[test]
fn test_page_ratio_floors_at_one() {
    let bag = attrs(json!({"TotalPages": 2, "Pages": 10}));
    let inference = CopyInference::infer(&bag, &InferenceContext::default());
    assert_eq!(inference.copies, 1);
    assert_eq!(inference.basis, CopyBasis::PageRatio);
}

#[test]
fn test_total_pages_alone_is_capped() {
    assert_eq!(infer_copies(&attrs(json!({"TotalPages": 7}))), 7);
    assert_eq!(
        infer_copies(&attrs(json!({"TotalPages": 250_000}))),
        MAX_TOTAL_PAGES_AS_COPIES
    );
    assert_eq!(infer_copies(&attrs(json!({"TotalPages": 1}))), 1);
}

#[test]
fn test_ticket_strategy() {
    let bag = attrs(json!({
        "Name": "Office, 12",
        "PrintTicket": "<Ticket><JobCopies attr=\"x\">  7 </JobCopies></Ticket>"
    }));
    let inference = CopyInference::infer(&bag, &InferenceContext::from_attributes(&bag));
    assert_eq!(inference.copies, 7);
    assert_eq!(inference.basis, CopyBasis::Ticket);
}

#[test]
fn test_ticket_alternate_field_name() {
    let bag = attrs(json!({"PrintTicketXML": "<x copycount=\"2\"/>"}));
    assert_eq!(infer_copies(&bag), 2);
}

#[test]
fn test_name_hint_fires_on_descriptive_name() {
    let bag = attrs(json!({"Name": "HP LaserJet, 3x copies"}));
    let inference = CopyInference::infer(&bag, &InferenceContext::from_attributes(&bag));
    assert_eq!(inference.copies, 3);
    assert_eq!(inference.basis, CopyBasis::NameHint);
}

#[test]
fn test_name_hint_suppressed_for_identity_composite() {
    assert_eq!(infer_copies(&attrs(json!({"Name": "Printer1, 482"}))), 1);

    let bag = attrs(json!({"Name": "Report copies, 4"}));
    let context = InferenceContext {
        job_id: None,
        name_is_identity: true,
    };
    assert_eq!(
        CopyInference::evaluate(Strategy::NameHint, &bag, &context),
        StrategyOutcome::Silent
    );
}

#[test]
fn test_failed_is_distinguishable_from_silent() {
    let broken = attrs(json!({"Copies": "three"}));
    let absent = AttributeMap::new();
    let context = InferenceContext::default();

    assert!(matches!(
        CopyInference::evaluate(Strategy::Explicit, &broken, &context),
        StrategyOutcome::Failed(InferError::Attribute(_))
    ));
    assert_eq!(
        CopyInference::evaluate(Strategy::Explicit, &absent, &context),
        StrategyOutcome::Silent
    );
    assert_eq!(infer_copies(&broken), 1);
}

#[test]
fn test_explicit_wins_over_lower_strategies() {
    let bag = attrs(json!({
        "Copies": 2,
        "TotalPages": 40,
        "Pages": 4,
        "PrintTicket": "<JobCopies>9</JobCopies>",
        "Name": "flyer 5x"
    }));
    let inference = CopyInference::infer(&bag, &InferenceContext::default());
    assert_eq!(inference.copies, 2);
    assert_eq!(inference.basis, CopyBasis::Explicit);
}
