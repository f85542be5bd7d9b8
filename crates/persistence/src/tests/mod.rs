// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod inventory_tests;

use crate::{NewJobCard, NewPartVariant, Persistence};
use workbay_audit::Actor;
use workbay_domain::{JobCard, JobStatus, PartVariant, TransitionTable};

pub const DEALER_ID: i64 = 10;
pub const CREATED_AT: &str = "2026-10-19T07:00:00Z";
pub const NOW: &str = "2026-10-19T12:00:00Z";

pub fn create_test_actor() -> Actor {
    Actor::user("tech-42")
}

pub fn create_test_job(persistence: &mut Persistence, job_number: &str) -> JobCard {
    persistence
        .create_job_card(&NewJobCard {
            dealer_id: DEALER_ID,
            job_number: job_number.to_string(),
            technician_id: Some(42),
            created_at: CREATED_AT.to_string(),
        })
        .unwrap()
}

pub fn create_test_variant(persistence: &mut Persistence, stock_quantity: u32) -> PartVariant {
    persistence
        .create_part_variant(&NewPartVariant {
            dealer_id: DEALER_ID,
            part_id: 500,
            sku: format!("OIL-FILTER-{stock_quantity}"),
            stock_quantity,
            price_cents: 1_250,
        })
        .unwrap()
}

/// Walks a job along the standard lifecycle to `in_progress`.
pub fn advance_to_in_progress(persistence: &mut Persistence, job_card_id: i64) {
    let table = TransitionTable::standard();
    for to in [
        JobStatus::Diagnosed,
        JobStatus::EstimateSent,
        JobStatus::CustomerApproved,
        JobStatus::InProgress,
    ] {
        persistence
            .transition_job(
                &table,
                job_card_id,
                workbay::TransitionCommand::new(to, create_test_actor()),
                NOW,
            )
            .unwrap();
    }
}
