// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Escalation scan and escalation handling tests.

use time::Duration;
use workbay_domain::{ENTITY_TYPE_JOB_CARD, EscalationStatus};
use workbay_persistence::Persistence;

use crate::tests::helpers::{
    DEALER_ID, FailingSink, OTHER_DEALER_ID, RecordingSink, advance_to_in_progress,
    create_foreign_manager, create_test_job, create_test_manager, create_test_rule,
    create_test_technician, now,
};
use crate::{
    ApiError, Notification, acknowledge_escalation, resolve_escalation, run_escalation_scan,
};

const FOUR_HOURS: &str = r#"{"threshold_hours": 4}"#;

#[test]
fn test_job_in_progress_past_threshold_escalates_once() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    let rule = create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    // Created five hours before the scan.
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);

    let first = run_escalation_scan(&mut persistence, &sink, now()).unwrap();
    assert_eq!(first.count, 1);
    let escalation = &first.escalations[0];
    assert_eq!(escalation.rule_id, rule.rule_id);
    assert_eq!(escalation.entity_type, ENTITY_TYPE_JOB_CARD);
    assert_eq!(escalation.entity_id, job.job_card_id);
    assert_eq!(escalation.level, 1);
    assert_eq!(escalation.status, EscalationStatus::Active);
    assert_eq!(
        escalation.reason,
        "Job JC-1 has been in progress for more than 4 hours (rule 'Stalled in bay')"
    );
    assert_eq!(
        sink.published(),
        vec![Notification::EscalationRaised {
            dealer_id: DEALER_ID,
            escalation_id: escalation.escalation_id,
            rule_id: rule.rule_id,
            entity_type: String::from(ENTITY_TYPE_JOB_CARD),
            entity_id: job.job_card_id,
            reason: escalation.reason.clone(),
        }]
    );

    let second = run_escalation_scan(&mut persistence, &sink, now() + Duration::hours(1)).unwrap();
    assert_eq!(second.count, 0);
    assert!(second.escalations.is_empty());
    assert_eq!(sink.published().len(), 1);
}

#[test]
fn test_recent_and_idle_jobs_are_not_escalated() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    let recent = create_test_job(&mut persistence, "JC-RECENT", "2026-10-19T09:00:00Z");
    advance_to_in_progress(&mut persistence, recent.job_card_id);
    // Old, but never started.
    create_test_job(&mut persistence, "JC-IDLE", "2026-10-18T09:00:00Z");

    let response = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();

    assert_eq!(response.count, 0);
}

#[test]
fn test_missing_or_malformed_condition_uses_default_threshold() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, "{}", true);
    create_test_rule(&mut persistence, DEALER_ID, "not json", true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);
    // Three and a half hours old: inside the four hour default.
    let fresh = create_test_job(&mut persistence, "JC-2", "2026-10-19T08:30:00Z");
    advance_to_in_progress(&mut persistence, fresh.job_card_id);

    let response = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();

    assert_eq!(response.count, 2);
    assert!(
        response
            .escalations
            .iter()
            .all(|e| e.entity_id == job.job_card_id)
    );
}

#[test]
fn test_oversized_threshold_falls_back_to_default() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, r#"{"threshold_hours": 1e300}"#, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);

    let response = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();

    assert_eq!(response.count, 1);
    assert_eq!(response.escalations[0].entity_id, job.job_card_id);
}

#[test]
fn test_inactive_rules_and_other_dealers_are_ignored() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, false);
    create_test_rule(&mut persistence, OTHER_DEALER_ID, FOUR_HOURS, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);

    let response = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();

    assert_eq!(response.count, 0);
}

#[test]
fn test_failing_sink_does_not_fail_scan() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);

    let response = run_escalation_scan(&mut persistence, &FailingSink, now()).unwrap();

    assert_eq!(response.count, 1);
}

#[test]
fn test_resolved_escalation_is_not_raised_again() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let sink = RecordingSink::default();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);
    let raised = run_escalation_scan(&mut persistence, &sink, now()).unwrap();
    let escalation_id = raised.escalations[0].escalation_id;

    let acknowledged =
        acknowledge_escalation(&mut persistence, &create_test_manager(), escalation_id, now())
            .unwrap();
    assert_eq!(acknowledged.status, EscalationStatus::Acknowledged);

    let resolved =
        resolve_escalation(&mut persistence, &create_test_manager(), escalation_id, now())
            .unwrap();
    assert_eq!(resolved.status, EscalationStatus::Resolved);
    assert_eq!(resolved.resolved_at.as_deref(), Some("2026-10-19T12:00:00Z"));

    let rescan = run_escalation_scan(&mut persistence, &sink, now() + Duration::hours(2)).unwrap();
    assert_eq!(rescan.count, 0);
}

#[test]
fn test_escalation_handling_is_authorized() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);
    let raised = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();
    let escalation_id = raised.escalations[0].escalation_id;

    assert!(matches!(
        acknowledge_escalation(&mut persistence, &create_test_technician(), escalation_id, now()),
        Err(ApiError::Forbidden { .. })
    ));
    assert!(matches!(
        resolve_escalation(&mut persistence, &create_foreign_manager(), escalation_id, now()),
        Err(ApiError::Forbidden { .. })
    ));
    assert!(matches!(
        resolve_escalation(&mut persistence, &create_test_manager(), 999, now()),
        Err(ApiError::NotFound { .. })
    ));
    assert_eq!(
        persistence.get_escalation(escalation_id).unwrap().status,
        EscalationStatus::Active
    );
}

#[test]
fn test_resolved_escalation_cannot_be_acknowledged() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    create_test_rule(&mut persistence, DEALER_ID, FOUR_HOURS, true);
    let job = create_test_job(&mut persistence, "JC-1", "2026-10-19T07:00:00Z");
    advance_to_in_progress(&mut persistence, job.job_card_id);
    let raised = run_escalation_scan(&mut persistence, &RecordingSink::default(), now()).unwrap();
    let escalation_id = raised.escalations[0].escalation_id;
    resolve_escalation(&mut persistence, &create_test_manager(), escalation_id, now()).unwrap();

    let err = acknowledge_escalation(&mut persistence, &create_test_manager(), escalation_id, now())
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest { ref field, .. } if field == "status"));
}
