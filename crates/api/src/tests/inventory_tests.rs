// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parts issue and return operation tests.

use workbay_persistence::Persistence;

use crate::tests::helpers::{
    DEALER_ID, OTHER_DEALER_ID, RecordingSink, create_foreign_manager, create_test_job,
    create_test_technician, create_test_variant, now,
};
use crate::{
    ApiError, IssuePartsRequest, Notification, ReturnPartsRequest, issue_parts, list_job_parts,
    return_parts,
};

const CREATED_AT: &str = "2026-10-19T07:00:00Z";

#[test]
fn test_issue_returns_usage_and_notifies() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let variant = create_test_variant(&mut persistence, DEALER_ID, 10);

    let usage = issue_parts(
        &mut persistence,
        &sink,
        &create_test_technician(),
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: variant.variant_id,
            quantity: 4,
        },
        now(),
    )
    .unwrap();

    assert_eq!(usage.quantity, 4);
    assert_eq!(usage.unit_price_cents, 2_500);
    assert_eq!(usage.total_price_cents, 10_000);
    assert_eq!(usage.issued_at, "2026-10-19T12:00:00Z");
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        6
    );
    assert_eq!(
        sink.published(),
        vec![Notification::PartsIssued {
            dealer_id: DEALER_ID,
            job_card_id: job.job_card_id,
            usage_id: usage.usage_id,
            variant_id: variant.variant_id,
            quantity: 4,
        }]
    );
}

#[test]
fn test_insufficient_stock_reports_available() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let variant = create_test_variant(&mut persistence, DEALER_ID, 3);

    let err = issue_parts(
        &mut persistence,
        &sink,
        &create_test_technician(),
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: variant.variant_id,
            quantity: 5,
        },
        now(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::InsufficientStock {
            variant_id: variant.variant_id,
            requested: 5,
            available: 3,
        }
    );
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        3
    );
    assert!(sink.published().is_empty());
}

#[test]
fn test_zero_quantity_is_rejected_before_lookup() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let err = issue_parts(
        &mut persistence,
        &RecordingSink::default(),
        &create_test_technician(),
        404,
        &IssuePartsRequest {
            variant_id: 1,
            quantity: 0,
        },
        now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest { ref field, .. } if field == "quantity"));
}

#[test]
fn test_variant_from_other_dealer_is_forbidden() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let foreign = create_test_variant(&mut persistence, OTHER_DEALER_ID, 10);

    let err = issue_parts(
        &mut persistence,
        &RecordingSink::default(),
        &create_test_technician(),
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: foreign.variant_id,
            quantity: 1,
        },
        now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
    assert_eq!(
        persistence
            .get_part_variant(foreign.variant_id)
            .unwrap()
            .stock_quantity,
        10
    );
}

#[test]
fn test_caller_from_other_dealer_cannot_issue() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let variant = create_test_variant(&mut persistence, DEALER_ID, 10);

    let err = issue_parts(
        &mut persistence,
        &RecordingSink::default(),
        &create_foreign_manager(),
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: variant.variant_id,
            quantity: 1,
        },
        now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_full_and_partial_returns() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    let caller = create_test_technician();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let variant = create_test_variant(&mut persistence, DEALER_ID, 10);
    let usage = issue_parts(
        &mut persistence,
        &sink,
        &caller,
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: variant.variant_id,
            quantity: 5,
        },
        now(),
    )
    .unwrap();

    let partial = return_parts(
        &mut persistence,
        &sink,
        &caller,
        usage.usage_id,
        &ReturnPartsRequest {
            quantity: 2,
            reason: Some(String::from("over-ordered")),
        },
        now(),
    )
    .unwrap();
    assert_eq!(partial.returned_quantity, 2);
    assert_eq!(partial.remaining_quantity, 3);
    assert!(!partial.fully_returned);

    let parts = list_job_parts(&mut persistence, &caller, job.job_card_id).unwrap();
    assert_eq!(parts.parts.len(), 1);
    assert_eq!(parts.parts[0].quantity, 3);
    assert_eq!(parts.parts[0].total_price_cents, 7_500);

    let full = return_parts(
        &mut persistence,
        &sink,
        &caller,
        usage.usage_id,
        &ReturnPartsRequest {
            quantity: 3,
            reason: None,
        },
        now(),
    )
    .unwrap();
    assert!(full.fully_returned);
    assert_eq!(full.remaining_quantity, 0);

    assert!(
        list_job_parts(&mut persistence, &caller, job.job_card_id)
            .unwrap()
            .parts
            .is_empty()
    );
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        10
    );
    assert_eq!(sink.published().len(), 3);
    assert!(matches!(
        sink.published().last(),
        Some(Notification::PartsReturned {
            fully_returned: true,
            returned_quantity: 3,
            ..
        })
    ));
}

#[test]
fn test_over_return_is_invalid_request() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    let caller = create_test_technician();
    let job = create_test_job(&mut persistence, "JC-1", CREATED_AT);
    let variant = create_test_variant(&mut persistence, DEALER_ID, 10);
    let usage = issue_parts(
        &mut persistence,
        &sink,
        &caller,
        job.job_card_id,
        &IssuePartsRequest {
            variant_id: variant.variant_id,
            quantity: 2,
        },
        now(),
    )
    .unwrap();

    let err = return_parts(
        &mut persistence,
        &sink,
        &caller,
        usage.usage_id,
        &ReturnPartsRequest {
            quantity: 5,
            reason: None,
        },
        now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest { ref field, .. } if field == "quantity"));
    assert_eq!(persistence.get_parts_usage(usage.usage_id).unwrap(), usage);
}

#[test]
fn test_return_of_missing_usage_is_not_found() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let err = return_parts(
        &mut persistence,
        &RecordingSink::default(),
        &create_test_technician(),
        404,
        &ReturnPartsRequest {
            quantity: 1,
            reason: None,
        },
        now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::NotFound { .. }));
}
