// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_job, create_test_rule};
use crate::{INITIAL_ESCALATION_LEVEL, escalation_threshold, plan_escalation};
use time::macros::datetime;
use workbay_domain::{ENTITY_TYPE_JOB_CARD, EscalationCondition, EscalationStatus, JobStatus};

#[test]
fn test_threshold_is_now_minus_hours() {
    let condition = EscalationCondition::from_json(r#"{"threshold_hours": 4}"#).unwrap();
    let threshold = escalation_threshold(&condition, datetime!(2026-10-19 12:00:00 UTC)).unwrap();
    assert_eq!(threshold, "2026-10-19T08:00:00Z");
}

#[test]
fn test_fractional_threshold() {
    let condition = EscalationCondition::from_json(r#"{"threshold_hours": 0.5}"#).unwrap();
    let threshold = escalation_threshold(&condition, datetime!(2026-10-19 12:00:00 UTC)).unwrap();
    assert_eq!(threshold, "2026-10-19T11:30:00Z");
}

#[test]
fn test_job_created_five_hours_ago_breaches_four_hour_rule() {
    let condition = EscalationCondition::default();
    let threshold = escalation_threshold(&condition, datetime!(2026-10-19 12:00:00 UTC)).unwrap();
    let job = create_test_job(JobStatus::InProgress);

    assert_eq!(job.created_at, "2026-10-19T07:00:00Z");
    assert!(job.created_at < threshold);
}

#[test]
fn test_planned_escalation_fields() {
    let rule = create_test_rule();
    let job = create_test_job(JobStatus::InProgress);
    let condition = EscalationCondition::from_json(&rule.condition_json).unwrap();

    let escalation =
        plan_escalation(&rule, &job, &condition, datetime!(2026-10-19 12:00:00 UTC)).unwrap();

    assert_eq!(escalation.dealer_id, rule.dealer_id);
    assert_eq!(escalation.rule_id, rule.rule_id);
    assert_eq!(escalation.entity_type, ENTITY_TYPE_JOB_CARD);
    assert_eq!(escalation.entity_id, job.job_card_id);
    assert_eq!(escalation.level, INITIAL_ESCALATION_LEVEL);
    assert_eq!(escalation.status, EscalationStatus::Active);
    assert_eq!(escalation.created_at, "2026-10-19T12:00:00Z");
    assert_eq!(
        escalation.reason,
        "Job JC-0001 has been in progress for more than 4 hours (rule 'Stalled in bay')"
    );
}
