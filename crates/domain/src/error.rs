// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::job_status::JobStatus;
use crate::types::EscalationStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A job status name is not recognized.
    InvalidJobStatus {
        /// The rejected status string.
        status: String,
    },
    /// The requested status change is not in the transition table.
    InvalidTransition {
        /// The job's current status.
        from: JobStatus,
        /// The requested status.
        to: JobStatus,
        /// The legal successors of `from`.
        allowed: Vec<JobStatus>,
    },
    /// A quantity must be a positive integer.
    InvalidQuantity {
        /// The rejected quantity.
        quantity: u32,
    },
    /// Not enough stock to satisfy an issue.
    InsufficientStock {
        /// The variant being issued.
        variant_id: i64,
        /// The quantity requested.
        requested: u32,
        /// The quantity currently in stock.
        available: u32,
    },
    /// A return exceeds what remains on the usage record.
    OverReturn {
        /// The usage record.
        usage_id: i64,
        /// The quantity requested for return.
        requested: u32,
        /// The quantity still held by the job.
        remaining: u32,
    },
    /// A price computation overflowed.
    PriceOverflow {
        /// The quantity involved.
        quantity: u32,
        /// The unit price involved.
        unit_price_cents: i64,
    },
    /// A stock counter would leave its representable range.
    StockOverflow {
        /// The variant whose counter overflowed.
        variant_id: i64,
    },
    /// The variant belongs to a different dealer than the job.
    DealerMismatch {
        /// The job's dealer.
        job_dealer_id: i64,
        /// The variant's dealer.
        variant_dealer_id: i64,
    },
    /// The cost-basis strategy is not `FIFO` or `LIFO`.
    InvalidCostBasisStrategy(String),
    /// The batch status is not recognized.
    InvalidBatchStatus(String),
    /// The escalation status is not recognized.
    InvalidEscalationStatus(String),
    /// The escalation status change is not permitted.
    InvalidEscalationTransition {
        /// The current status.
        from: EscalationStatus,
        /// The requested status.
        to: EscalationStatus,
    },
    /// An escalation rule condition payload is malformed.
    InvalidEscalationCondition {
        /// Why the payload was rejected.
        reason: String,
    },
    /// A job event type is not recognized.
    InvalidJobEventType(String),
    /// The job event type is written only by the core itself.
    ReservedJobEventType(String),
    /// A timestamp could not be formatted or parsed.
    InvalidTimestamp {
        /// The offending value.
        value: String,
        /// The underlying error message.
        error: String,
    },
}

fn join_statuses(statuses: &[JobStatus]) -> String {
    if statuses.is_empty() {
        return String::from("none");
    }
    statuses
        .iter()
        .map(JobStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJobStatus { status } => write!(f, "Invalid job status: '{status}'"),
            Self::InvalidTransition { from, to, allowed } => {
                write!(
                    f,
                    "Cannot transition job from '{from}' to '{to}'. Allowed: {}",
                    join_statuses(allowed)
                )
            }
            Self::InvalidQuantity { quantity } => {
                write!(f, "Invalid quantity: {quantity}. Must be greater than 0")
            }
            Self::InsufficientStock {
                variant_id,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient stock for variant {variant_id}: requested {requested}, available {available}"
                )
            }
            Self::OverReturn {
                usage_id,
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "Cannot return {requested} units on usage {usage_id}: only {remaining} issued"
                )
            }
            Self::PriceOverflow {
                quantity,
                unit_price_cents,
            } => {
                write!(
                    f,
                    "Price overflow computing {quantity} x {unit_price_cents} cents"
                )
            }
            Self::StockOverflow { variant_id } => {
                write!(f, "Stock counter overflow for variant {variant_id}")
            }
            Self::DealerMismatch {
                job_dealer_id,
                variant_dealer_id,
            } => {
                write!(
                    f,
                    "Variant belongs to dealer {variant_dealer_id}, job belongs to dealer {job_dealer_id}"
                )
            }
            Self::InvalidCostBasisStrategy(s) => {
                write!(f, "Invalid cost-basis strategy: '{s}'. Must be FIFO or LIFO")
            }
            Self::InvalidBatchStatus(s) => write!(f, "Invalid batch status: '{s}'"),
            Self::InvalidEscalationStatus(s) => write!(f, "Invalid escalation status: '{s}'"),
            Self::InvalidEscalationTransition { from, to } => {
                write!(
                    f,
                    "Cannot move escalation from '{}' to '{}'",
                    from.as_str(),
                    to.as_str()
                )
            }
            Self::InvalidEscalationCondition { reason } => {
                write!(f, "Invalid escalation condition: {reason}")
            }
            Self::InvalidJobEventType(s) => write!(f, "Invalid job event type: '{s}'"),
            Self::ReservedJobEventType(s) => {
                write!(f, "Job event type '{s}' is recorded by the system only")
            }
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Invalid timestamp '{value}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
