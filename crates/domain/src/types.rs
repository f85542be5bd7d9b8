// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::job_status::JobStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Entity type recorded on escalations raised against job cards.
pub const ENTITY_TYPE_JOB_CARD: &str = "job_card";

/// A vehicle in service, scoped to a dealer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCard {
    pub job_card_id: i64,
    pub dealer_id: i64,
    pub job_number: String,
    pub status: JobStatus,
    pub technician_id: Option<i64>,
    pub created_at: String,
    pub service_started_at: Option<String>,
    pub service_ended_at: Option<String>,
    pub updated_at: String,
}

/// A stockable variant of a part with its aggregate stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartVariant {
    pub variant_id: i64,
    pub dealer_id: i64,
    pub part_id: i64,
    pub sku: String,
    pub stock_quantity: u32,
    /// Current reference price in minor currency units.
    pub price_cents: i64,
}

/// Parts consumed by a job.
///
/// `unit_price_cents` is copied from the variant at issue time and is never
/// re-read from the variant afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartsUsage {
    pub usage_id: i64,
    pub job_card_id: i64,
    pub variant_id: i64,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub issued_by: String,
    pub issued_at: String,
}

/// Lifecycle of a received inventory batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Active,
    Depleted,
    Quarantined,
}

impl BatchStatus {
    /// Returns the string representation used in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Depleted => "depleted",
            Self::Quarantined => "quarantined",
        }
    }
}

impl FromStr for BatchStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "depleted" => Ok(Self::Depleted),
            "quarantined" => Ok(Self::Quarantined),
            _ => Err(DomainError::InvalidBatchStatus(s.to_string())),
        }
    }
}

/// A received lot of stock, used for cost-basis valuation only.
///
/// Batches are independent of [`PartVariant::stock_quantity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub batch_id: i64,
    pub dealer_id: i64,
    pub product_id: i64,
    pub batch_number: String,
    /// Receipt date, `YYYY-MM-DD`.
    pub received_date: String,
    pub initial_quantity: u32,
    pub current_quantity: u32,
    pub unit_cost_cents: i64,
    pub status: BatchStatus,
}

/// Ordering strategy for cost-basis batch selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostBasisStrategy {
    /// Oldest receipt first.
    #[serde(rename = "FIFO")]
    Fifo,
    /// Newest receipt first.
    #[serde(rename = "LIFO")]
    Lifo,
}

impl CostBasisStrategy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lifo => "LIFO",
        }
    }

    /// True when batches should be ordered oldest first.
    #[must_use]
    pub const fn oldest_first(&self) -> bool {
        matches!(self, Self::Fifo)
    }
}

impl FromStr for CostBasisStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LIFO" => Ok(Self::Lifo),
            _ => Err(DomainError::InvalidCostBasisStrategy(s.to_string())),
        }
    }
}

/// What causes an escalation rule to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationTrigger {
    /// A job has stayed in progress past a threshold.
    TimeBreach,
    /// Any trigger authored elsewhere that this core does not evaluate.
    Other(String),
}

impl EscalationTrigger {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TimeBreach => "time_breach",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for EscalationTrigger {
    fn from(s: &str) -> Self {
        match s {
            "time_breach" => Self::TimeBreach,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An externally authored SLA rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub rule_id: i64,
    pub dealer_id: i64,
    pub name: String,
    pub trigger: EscalationTrigger,
    /// Raw JSON condition payload, e.g. `{"threshold_hours": 4}`.
    pub condition_json: String,
    pub action: String,
    pub is_active: bool,
}

/// Resolution state of an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl EscalationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }

    /// Validates a change of escalation status.
    ///
    /// Allowed: active → acknowledged, active → resolved,
    /// acknowledged → resolved.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEscalationTransition` otherwise.
    pub const fn validate_transition(&self, to: Self) -> Result<(), DomainError> {
        match (self, to) {
            (Self::Active, Self::Acknowledged | Self::Resolved)
            | (Self::Acknowledged, Self::Resolved) => Ok(()),
            _ => Err(DomainError::InvalidEscalationTransition { from: *self, to }),
        }
    }
}

impl FromStr for EscalationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err(DomainError::InvalidEscalationStatus(s.to_string())),
        }
    }
}

/// A raised escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub escalation_id: i64,
    pub dealer_id: i64,
    pub rule_id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub level: u8,
    pub reason: String,
    pub status: EscalationStatus,
    pub created_at: String,
    pub resolved_at: Option<String>,
}
