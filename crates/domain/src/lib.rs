// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod escalation;
mod job_status;
mod timestamp;
mod transition;
mod types;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use escalation::{DEFAULT_THRESHOLD_HOURS, EscalationCondition, MAX_THRESHOLD_HOURS};
pub use job_status::JobStatus;
pub use timestamp::{format_timestamp, normalize_date, normalize_timestamp, parse_timestamp};
pub use transition::TransitionTable;

// Re-export public types
pub use types::{
    BatchStatus, CostBasisStrategy, ENTITY_TYPE_JOB_CARD, Escalation, EscalationRule,
    EscalationStatus, EscalationTrigger, InventoryBatch, JobCard, PartVariant, PartsUsage,
};
