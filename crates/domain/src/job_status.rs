// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job card lifecycle states.
//!
//! A job card moves through these states only via the transition
//! orchestrator. Which moves are legal is decided by the
//! [`TransitionTable`](crate::TransitionTable), not by this type.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a job card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Intake recorded, nothing inspected yet
    Created,
    /// Technician has diagnosed the vehicle
    Diagnosed,
    /// Estimate delivered to the customer
    EstimateSent,
    /// Customer approved the estimate
    CustomerApproved,
    /// Work is being performed
    InProgress,
    /// Work blocked on parts
    WaitingParts,
    /// Extra work discovered during service
    AdditionalWork,
    /// Awaiting quality-control review
    QcPending,
    /// Quality control passed
    QcApproved,
    /// Quality control failed, rework required
    QcRejected,
    /// Service finished
    Completed,
    /// Invoice issued
    Invoiced,
    /// Invoice settled
    Paid,
    /// Vehicle handed back to the customer
    Delivered,
    /// Job abandoned
    Cancelled,
    /// Job parked
    OnHold,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 16] = [
        Self::Created,
        Self::Diagnosed,
        Self::EstimateSent,
        Self::CustomerApproved,
        Self::InProgress,
        Self::WaitingParts,
        Self::AdditionalWork,
        Self::QcPending,
        Self::QcApproved,
        Self::QcRejected,
        Self::Completed,
        Self::Invoiced,
        Self::Paid,
        Self::Delivered,
        Self::Cancelled,
        Self::OnHold,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Diagnosed => "diagnosed",
            Self::EstimateSent => "estimate_sent",
            Self::CustomerApproved => "customer_approved",
            Self::InProgress => "in_progress",
            Self::WaitingParts => "waiting_parts",
            Self::AdditionalWork => "additional_work",
            Self::QcPending => "qc_pending",
            Self::QcApproved => "qc_approved",
            Self::QcRejected => "qc_rejected",
            Self::Completed => "completed",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::OnHold => "on_hold",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidJobStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidJobStatus {
                status: s.to_string(),
            })
    }

    /// The status every job card starts in.
    #[must_use]
    pub const fn initial() -> Self {
        Self::Created
    }

    /// Returns true if no further lifecycle movement is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns true if entering this status closes the service window.
    #[must_use]
    pub const fn ends_service(&self) -> bool {
        matches!(self, Self::Completed | Self::Delivered)
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
