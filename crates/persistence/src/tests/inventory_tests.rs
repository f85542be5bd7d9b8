// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parts ledger persistence tests.

use crate::tests::{NOW, create_test_actor, create_test_job, create_test_variant};
use crate::{NewJobCard, NewPartVariant, Persistence, PersistenceError};
use diesel::RunQueryDsl;
use serde_json::json;
use workbay::CoreError;
use workbay_audit::JobEventKind;
use workbay_domain::DomainError;

#[test]
fn test_issue_decrements_stock_and_records_usage() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 10);

    let usage = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 3, create_test_actor(), NOW)
        .unwrap();

    assert_eq!(usage.quantity, 3);
    assert_eq!(usage.unit_price_cents, 1_250);
    assert_eq!(usage.total_price_cents, 3_750);
    assert_eq!(usage.issued_by, "tech-42");
    assert_eq!(usage.issued_at, NOW);

    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        7
    );
    assert_eq!(persistence.get_parts_usage(usage.usage_id).unwrap(), usage);

    let events = persistence.get_job_events(job.job_card_id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, JobEventKind::PartsIssued);
    assert_eq!(events[0].description, "Issued 3 x OIL-FILTER-10");
}

#[test]
fn test_issue_exceeding_stock_changes_nothing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 3);

    let err = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 5, create_test_actor(), NOW)
        .unwrap_err();

    assert_eq!(
        err,
        PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InsufficientStock {
                variant_id: variant.variant_id,
                requested: 5,
                available: 3,
            }
        ))
    );
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        3
    );
    assert!(
        persistence
            .list_parts_usage_for_job(job.job_card_id)
            .unwrap()
            .is_empty()
    );
    assert!(persistence.get_job_events(job.job_card_id).unwrap().is_empty());
}

#[test]
fn test_issue_entire_stock_leaves_zero() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 4);

    persistence
        .issue_parts(job.job_card_id, variant.variant_id, 4, create_test_actor(), NOW)
        .unwrap();

    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        0
    );
}

#[test]
fn test_issue_zero_quantity_is_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 4);

    let err = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 0, create_test_actor(), NOW)
        .unwrap_err();

    assert_eq!(
        err,
        PersistenceError::Rejected(CoreError::DomainViolation(DomainError::InvalidQuantity {
            quantity: 0
        }))
    );
}

#[test]
fn test_issue_across_dealers_is_rejected() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let foreign = persistence
        .create_part_variant(&NewPartVariant {
            dealer_id: 99,
            part_id: 1,
            sku: String::from("WIPER-22"),
            stock_quantity: 10,
            price_cents: 900,
        })
        .unwrap();

    let err = persistence
        .issue_parts(job.job_card_id, foreign.variant_id, 1, create_test_actor(), NOW)
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected(CoreError::DomainViolation(DomainError::DealerMismatch {
            job_dealer_id: 10,
            variant_dealer_id: 99,
        }))
    ));
    assert_eq!(
        persistence
            .get_part_variant(foreign.variant_id)
            .unwrap()
            .stock_quantity,
        10
    );
}

#[test]
fn test_issue_for_missing_records_is_not_found() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 4);

    assert!(matches!(
        persistence.issue_parts(999, variant.variant_id, 1, create_test_actor(), NOW),
        Err(PersistenceError::NotFound(_))
    ));
    assert!(matches!(
        persistence.issue_parts(job.job_card_id, 999, 1, create_test_actor(), NOW),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_full_return_restores_stock_and_deletes_usage() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 10);
    let usage = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 4, create_test_actor(), NOW)
        .unwrap();

    let plan = persistence
        .return_parts(
            usage.usage_id,
            4,
            Some("wrong size"),
            create_test_actor(),
            "2026-10-19T13:00:00Z",
        )
        .unwrap();

    assert!(plan.fully_returned());
    assert_eq!(plan.remaining_quantity(), 0);
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        10
    );
    assert!(matches!(
        persistence.get_parts_usage(usage.usage_id),
        Err(PersistenceError::NotFound(_))
    ));

    let events = persistence.get_job_events(job.job_card_id).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_type, JobEventKind::PartsReturned);
    assert_eq!(events[1].description, "Returned 4 of 4 units: wrong size");
    assert_eq!(events[1].created_at, "2026-10-19T13:00:00Z");
}

#[test]
fn test_partial_return_keeps_original_unit_price() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 10);
    let usage = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 5, create_test_actor(), NOW)
        .unwrap();

    let plan = persistence
        .return_parts(usage.usage_id, 2, None, create_test_actor(), NOW)
        .unwrap();

    assert!(!plan.fully_returned());
    assert_eq!(plan.remaining_quantity(), 3);

    let updated = persistence.get_parts_usage(usage.usage_id).unwrap();
    assert_eq!(updated.quantity, 3);
    assert_eq!(updated.unit_price_cents, 1_250);
    assert_eq!(updated.total_price_cents, 3_750);
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        7
    );

    let events = persistence.get_job_events(job.job_card_id).unwrap();
    assert_eq!(
        events[1].metadata.as_ref().map(|m| m["remaining_quantity"].clone()),
        Some(json!(3))
    );
}

#[test]
fn test_over_return_changes_nothing() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 10);
    let usage = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 2, create_test_actor(), NOW)
        .unwrap();

    let err = persistence
        .return_parts(usage.usage_id, 3, None, create_test_actor(), NOW)
        .unwrap_err();

    assert_eq!(
        err,
        PersistenceError::Rejected(CoreError::DomainViolation(DomainError::OverReturn {
            usage_id: usage.usage_id,
            requested: 3,
            remaining: 2,
        }))
    );
    assert_eq!(persistence.get_parts_usage(usage.usage_id).unwrap(), usage);
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        8
    );
    assert_eq!(persistence.get_job_events(job.job_card_id).unwrap().len(), 1);
}

#[test]
fn test_usage_listing_is_scoped_to_job() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let first = create_test_job(&mut persistence, "JC-1");
    let second = persistence
        .create_job_card(&NewJobCard {
            dealer_id: crate::tests::DEALER_ID,
            job_number: String::from("JC-2"),
            technician_id: None,
            created_at: NOW.to_string(),
        })
        .unwrap();
    let variant = create_test_variant(&mut persistence, 20);

    for quantity in [1, 2] {
        persistence
            .issue_parts(
                first.job_card_id,
                variant.variant_id,
                quantity,
                create_test_actor(),
                NOW,
            )
            .unwrap();
    }
    persistence
        .issue_parts(second.job_card_id, variant.variant_id, 5, create_test_actor(), NOW)
        .unwrap();

    let usages = persistence.list_parts_usage_for_job(first.job_card_id).unwrap();
    let quantities: Vec<u32> = usages.iter().map(|u| u.quantity).collect();
    assert_eq!(quantities, vec![1, 2]);
    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        12
    );
}

#[test]
fn test_failed_usage_insert_restores_stock() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let job = create_test_job(&mut persistence, "JC-1");
    let variant = create_test_variant(&mut persistence, 10);

    diesel::sql_query(
        "CREATE TRIGGER reject_parts_usage BEFORE INSERT ON parts_usage \
         BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
    )
    .execute(&mut persistence.conn)
    .unwrap();

    let err = persistence
        .issue_parts(job.job_card_id, variant.variant_id, 4, create_test_actor(), NOW)
        .unwrap_err();
    assert!(matches!(err, PersistenceError::QueryFailed(_)));

    assert_eq!(
        persistence
            .get_part_variant(variant.variant_id)
            .unwrap()
            .stock_quantity,
        10
    );
    assert!(
        persistence
            .list_parts_usage_for_job(job.job_card_id)
            .unwrap()
            .is_empty()
    );
    assert!(persistence.get_job_events(job.job_card_id).unwrap().is_empty());
}
