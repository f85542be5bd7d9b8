// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The job card transition table and validator.
//!
//! The table is an immutable value. It is built once at process start
//! (normally via [`TransitionTable::standard`]) and handed to every caller
//! that needs to validate a status change. Nothing in this crate reads a
//! global table.

use crate::error::DomainError;
use crate::job_status::JobStatus;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Fixed adjacency map from each status to its legal successors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    edges: BTreeMap<JobStatus, Vec<JobStatus>>,
}

impl TransitionTable {
    /// Builds the standard workshop lifecycle.
    #[must_use]
    pub fn standard() -> Self {
        use JobStatus::{
            AdditionalWork, Cancelled, Completed, Created, CustomerApproved, Delivered,
            Diagnosed, EstimateSent, InProgress, Invoiced, OnHold, Paid, QcApproved, QcPending,
            QcRejected, WaitingParts,
        };

        Self::from_edges([
            (Created, vec![Diagnosed, Cancelled, OnHold]),
            (Diagnosed, vec![EstimateSent, Cancelled, OnHold]),
            (EstimateSent, vec![CustomerApproved, Cancelled, OnHold]),
            (CustomerApproved, vec![InProgress, Cancelled, OnHold]),
            (
                InProgress,
                vec![WaitingParts, AdditionalWork, QcPending, Cancelled, OnHold],
            ),
            (WaitingParts, vec![InProgress, Cancelled, OnHold]),
            (
                AdditionalWork,
                vec![EstimateSent, InProgress, Cancelled, OnHold],
            ),
            (QcPending, vec![QcApproved, QcRejected]),
            (QcApproved, vec![Completed]),
            (QcRejected, vec![InProgress]),
            (Completed, vec![Invoiced]),
            (Invoiced, vec![Paid]),
            (Paid, vec![Delivered]),
            (Delivered, vec![]),
            (Cancelled, vec![]),
            (
                OnHold,
                vec![
                    Diagnosed,
                    EstimateSent,
                    CustomerApproved,
                    InProgress,
                    WaitingParts,
                    Cancelled,
                ],
            ),
        ])
    }

    /// Builds a table from explicit `(from, successors)` pairs.
    ///
    /// Statuses that never appear as a `from` have no successors.
    /// Duplicate successors are collapsed, keeping the first occurrence.
    #[must_use]
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (JobStatus, Vec<JobStatus>)>,
    {
        let mut map: BTreeMap<JobStatus, Vec<JobStatus>> = BTreeMap::new();
        for (from, successors) in edges {
            let entry = map.entry(from).or_default();
            for to in successors {
                if !entry.contains(&to) {
                    entry.push(to);
                }
            }
        }
        Self { edges: map }
    }

    /// Returns true iff `to` is a legal successor of `from`.
    ///
    /// A `from` with no entry in the table yields false.
    #[must_use]
    pub fn can_transition(&self, from: JobStatus, to: JobStatus) -> bool {
        self.edges
            .get(&from)
            .is_some_and(|successors| successors.contains(&to))
    }

    /// String form of [`can_transition`](Self::can_transition).
    ///
    /// Unknown status names on either side yield false.
    #[must_use]
    pub fn can_transition_str(&self, from: &str, to: &str) -> bool {
        match (JobStatus::from_str(from), JobStatus::from_str(to)) {
            (Ok(from), Ok(to)) => self.can_transition(from, to),
            _ => false,
        }
    }

    /// Returns the legal successors of `from`, in declaration order.
    #[must_use]
    pub fn successors(&self, from: JobStatus) -> &[JobStatus] {
        self.edges.get(&from).map_or(&[], Vec::as_slice)
    }

    /// Validates a requested status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` carrying the legal successor
    /// set when `to` is not reachable from `from`.
    pub fn validate(&self, from: JobStatus, to: JobStatus) -> Result<(), DomainError> {
        if self.can_transition(from, to) {
            return Ok(());
        }

        Err(DomainError::InvalidTransition {
            from,
            to,
            allowed: self.successors(from).to_vec(),
        })
    }

    /// Iterates over every legal `(from, to)` edge.
    pub fn edges(&self) -> impl Iterator<Item = (JobStatus, JobStatus)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, successors)| successors.iter().map(move |to| (*from, *to)))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}
