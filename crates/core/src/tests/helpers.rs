// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use workbay_audit::Actor;
use workbay_domain::{EscalationRule, EscalationTrigger, JobCard, JobStatus, PartVariant, PartsUsage};

pub const NOW: &str = "2026-10-19T12:00:00Z";

pub fn create_test_actor() -> Actor {
    Actor::user("tech-42")
}

pub fn create_test_job(status: JobStatus) -> JobCard {
    JobCard {
        job_card_id: 1,
        dealer_id: 10,
        job_number: String::from("JC-0001"),
        status,
        technician_id: Some(42),
        created_at: String::from("2026-10-19T07:00:00Z"),
        service_started_at: None,
        service_ended_at: None,
        updated_at: String::from("2026-10-19T07:00:00Z"),
    }
}

pub fn create_test_variant(stock_quantity: u32) -> PartVariant {
    PartVariant {
        variant_id: 5,
        dealer_id: 10,
        part_id: 50,
        sku: String::from("BRK-PAD-F"),
        stock_quantity,
        price_cents: 2_500,
    }
}

pub fn create_test_usage(quantity: u32) -> PartsUsage {
    PartsUsage {
        usage_id: 77,
        job_card_id: 1,
        variant_id: 5,
        quantity,
        unit_price_cents: 2_500,
        total_price_cents: 2_500 * i64::from(quantity),
        issued_by: String::from("tech-42"),
        issued_at: String::from("2026-10-19T08:00:00Z"),
    }
}

pub fn create_test_rule() -> EscalationRule {
    EscalationRule {
        rule_id: 3,
        dealer_id: 10,
        name: String::from("Stalled in bay"),
        trigger: EscalationTrigger::TimeBreach,
        condition_json: String::from(r#"{"threshold_hours": 4}"#),
        action: String::from("notify_manager"),
        is_active: true,
    }
}
