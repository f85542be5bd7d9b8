// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use workbay_audit::{Actor, JobEvent, StatusChange};
use workbay_domain::{EscalationStatus, JobCard, PartsUsage};

/// The result of a successful job status transition.
///
/// Transitions are atomic: the caller must commit the new job, the history
/// entry and the event together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The job card after the transition.
    pub new_job: JobCard,
    /// The status history entry recording this transition.
    pub status_change: StatusChange,
    /// The job event recording this transition.
    pub event: JobEvent,
}

/// A validated parts issue, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePlan {
    pub job_card_id: i64,
    pub variant_id: i64,
    pub sku: String,
    pub quantity: u32,
    /// Variant price at the moment of issue.
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    /// Variant stock after the decrement.
    pub remaining_stock: u32,
    pub actor: Actor,
    pub issued_at: String,
}

impl IssuePlan {
    /// Builds the committed usage record once storage has assigned its id.
    #[must_use]
    pub fn to_usage(&self, usage_id: i64) -> PartsUsage {
        PartsUsage {
            usage_id,
            job_card_id: self.job_card_id,
            variant_id: self.variant_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            total_price_cents: self.total_price_cents,
            issued_by: self.actor.id.clone(),
            issued_at: self.issued_at.clone(),
        }
    }

    /// The job event for the committed usage record.
    #[must_use]
    pub fn event(&self, usage: &PartsUsage) -> JobEvent {
        JobEvent::parts_issued(usage, &self.sku, self.actor.clone())
    }
}

/// What happens to a usage record when parts are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Every unit came back; the usage record is deleted.
    Full,
    /// Some units remain on the job.
    Partial {
        new_quantity: u32,
        new_total_price_cents: i64,
    },
}

/// A validated parts return, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPlan {
    pub usage_id: i64,
    pub job_card_id: i64,
    pub variant_id: i64,
    pub returned_quantity: u32,
    pub outcome: ReturnOutcome,
    pub event: JobEvent,
}

impl ReturnPlan {
    /// Units still held by the job after the return.
    #[must_use]
    pub const fn remaining_quantity(&self) -> u32 {
        match self.outcome {
            ReturnOutcome::Full => 0,
            ReturnOutcome::Partial { new_quantity, .. } => new_quantity,
        }
    }

    #[must_use]
    pub const fn fully_returned(&self) -> bool {
        matches!(self.outcome, ReturnOutcome::Full)
    }
}

/// An escalation to be inserted by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEscalation {
    pub dealer_id: i64,
    pub rule_id: i64,
    pub entity_type: &'static str,
    pub entity_id: i64,
    pub level: u8,
    pub reason: String,
    pub status: EscalationStatus,
    pub created_at: String,
}
