// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, EscalationStatus, JobStatus};

#[test]
fn test_domain_error_display() {
    let err = DomainError::InvalidTransition {
        from: JobStatus::Created,
        to: JobStatus::QcApproved,
        allowed: vec![JobStatus::Diagnosed, JobStatus::Cancelled, JobStatus::OnHold],
    };
    assert_eq!(
        format!("{err}"),
        "Cannot transition job from 'created' to 'qc_approved'. Allowed: diagnosed, cancelled, on_hold"
    );

    let err = DomainError::InvalidTransition {
        from: JobStatus::Delivered,
        to: JobStatus::Created,
        allowed: vec![],
    };
    assert_eq!(
        format!("{err}"),
        "Cannot transition job from 'delivered' to 'created'. Allowed: none"
    );

    let err = DomainError::InsufficientStock {
        variant_id: 7,
        requested: 5,
        available: 3,
    };
    assert_eq!(
        format!("{err}"),
        "Insufficient stock for variant 7: requested 5, available 3"
    );

    let err = DomainError::OverReturn {
        usage_id: 11,
        requested: 4,
        remaining: 2,
    };
    assert_eq!(
        format!("{err}"),
        "Cannot return 4 units on usage 11: only 2 issued"
    );

    let err = DomainError::InvalidQuantity { quantity: 0 };
    assert_eq!(
        format!("{err}"),
        "Invalid quantity: 0. Must be greater than 0"
    );

    let err = DomainError::InvalidCostBasisStrategy(String::from("AVG"));
    assert_eq!(
        format!("{err}"),
        "Invalid cost-basis strategy: 'AVG'. Must be FIFO or LIFO"
    );

    let err = DomainError::InvalidEscalationTransition {
        from: EscalationStatus::Resolved,
        to: EscalationStatus::Active,
    };
    assert_eq!(
        format!("{err}"),
        "Cannot move escalation from 'resolved' to 'active'"
    );

    let err = DomainError::ReservedJobEventType(String::from("status_change"));
    assert_eq!(
        format!("{err}"),
        "Job event type 'status_change' is recorded by the system only"
    );
}
