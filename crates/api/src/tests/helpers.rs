// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;
use time::OffsetDateTime;
use time::macros::datetime;
use workbay_domain::{EscalationRule, EscalationTrigger, JobCard, PartVariant, TransitionTable};
use workbay_persistence::{NewEscalationRule, NewJobCard, NewPartVariant, Persistence};

use crate::{
    CallerContext, Notification, NotificationSink, NotifyError, Role, TransitionRequest,
    transition_job,
};

pub const DEALER_ID: i64 = 10;
pub const OTHER_DEALER_ID: i64 = 20;

pub const fn now() -> OffsetDateTime {
    datetime!(2026-10-19 12:00:00 UTC)
}

/// Records every published notification.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        self.published.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Rejects every notification.
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn publish(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError {
            reason: String::from("no subscribers"),
        })
    }
}

pub fn create_test_technician() -> CallerContext {
    CallerContext::new(String::from("tech-42"), DEALER_ID, Role::Technician)
}

pub fn create_test_manager() -> CallerContext {
    CallerContext::new(String::from("manager-7"), DEALER_ID, Role::Manager)
}

pub fn create_foreign_manager() -> CallerContext {
    CallerContext::new(String::from("manager-99"), OTHER_DEALER_ID, Role::Manager)
}

pub fn create_platform_admin() -> CallerContext {
    CallerContext::new(String::from("ops-1"), OTHER_DEALER_ID, Role::PlatformAdmin)
}

pub fn create_test_job(persistence: &mut Persistence, job_number: &str, created_at: &str) -> JobCard {
    persistence
        .create_job_card(&NewJobCard {
            dealer_id: DEALER_ID,
            job_number: job_number.to_string(),
            technician_id: Some(42),
            created_at: created_at.to_string(),
        })
        .unwrap()
}

pub fn create_test_variant(
    persistence: &mut Persistence,
    dealer_id: i64,
    stock_quantity: u32,
) -> PartVariant {
    persistence
        .create_part_variant(&NewPartVariant {
            dealer_id,
            part_id: 500,
            sku: format!("BRK-PAD-{dealer_id}"),
            stock_quantity,
            price_cents: 2_500,
        })
        .unwrap()
}

pub fn create_test_rule(
    persistence: &mut Persistence,
    dealer_id: i64,
    condition_json: &str,
    is_active: bool,
) -> EscalationRule {
    persistence
        .create_escalation_rule(&NewEscalationRule {
            dealer_id,
            name: String::from("Stalled in bay"),
            trigger: EscalationTrigger::TimeBreach,
            condition_json: condition_json.to_string(),
            action: String::from("notify_manager"),
            is_active,
        })
        .unwrap()
}

pub fn transition_request(to_status: &str) -> TransitionRequest {
    TransitionRequest {
        to_status: to_status.to_string(),
        reason: None,
        metadata: None,
    }
}

/// Walks a job through the standard lifecycle up to `in_progress`.
pub fn advance_to_in_progress(persistence: &mut Persistence, job_card_id: i64) {
    let table = TransitionTable::standard();
    let sink = RecordingSink::default();
    for status in ["diagnosed", "estimate_sent", "customer_approved", "in_progress"] {
        transition_job(
            persistence,
            &sink,
            &table,
            &create_test_technician(),
            job_card_id,
            &transition_request(status),
            now(),
        )
        .unwrap();
    }
}
