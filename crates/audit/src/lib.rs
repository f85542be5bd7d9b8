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
    clippy::unwrap_used,
    clippy::expect_used
)]

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use workbay_domain::{DomainError, JobStatus, PartsUsage};

/// Actor type recorded for requests made by an authenticated user.
pub const ACTOR_TYPE_USER: &str = "user";
/// Actor type recorded for work initiated by the escalation scheduler.
pub const ACTOR_TYPE_SYSTEM: &str = "system";

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a user or the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates a user actor.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(id.into(), String::from(ACTOR_TYPE_USER))
    }

    /// The actor used for scheduler-initiated work.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("scheduler"), String::from(ACTOR_TYPE_SYSTEM))
    }
}

/// Kind of entry in a job's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    StatusChange,
    PartsIssued,
    PartsReturned,
    PhotoAdded,
    ChecklistUpdate,
    NoteAdded,
}

impl JobEventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChange => "status_change",
            Self::PartsIssued => "parts_issued",
            Self::PartsReturned => "parts_returned",
            Self::PhotoAdded => "photo_added",
            Self::ChecklistUpdate => "checklist_update",
            Self::NoteAdded => "note_added",
        }
    }

    /// Returns true for kinds that only the core itself records.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::StatusChange | Self::PartsIssued | Self::PartsReturned
        )
    }
}

impl FromStr for JobEventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status_change" => Ok(Self::StatusChange),
            "parts_issued" => Ok(Self::PartsIssued),
            "parts_returned" => Ok(Self::PartsReturned),
            "photo_added" => Ok(Self::PhotoAdded),
            "checklist_update" => Ok(Self::ChecklistUpdate),
            "note_added" => Ok(Self::NoteAdded),
            _ => Err(DomainError::InvalidJobEventType(s.to_string())),
        }
    }
}

impl std::fmt::Display for JobEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable status history entry.
///
/// Every successful job status transition produces exactly one of these,
/// committed in the same unit of work as the status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub job_card_id: i64,
    pub from: JobStatus,
    pub to: JobStatus,
    pub actor: Actor,
    pub reason: Option<String>,
    pub metadata: Option<Value>,
    pub occurred_at: String,
}

impl StatusChange {
    /// Creates a new `StatusChange`.
    ///
    /// # Arguments
    ///
    /// * `job_card_id` - The job whose status changed
    /// * `from` - The status before the transition
    /// * `to` - The status after the transition
    /// * `actor` - Who performed the transition
    /// * `reason` - Optional free-text reason
    /// * `metadata` - Optional caller-supplied metadata
    /// * `occurred_at` - Storage timestamp of the transition
    #[must_use]
    pub const fn new(
        job_card_id: i64,
        from: JobStatus,
        to: JobStatus,
        actor: Actor,
        reason: Option<String>,
        metadata: Option<Value>,
        occurred_at: String,
    ) -> Self {
        Self {
            job_card_id,
            from,
            to,
            actor,
            reason,
            metadata,
            occurred_at,
        }
    }

    /// Serialized metadata for storage.
    #[must_use]
    pub fn metadata_json(&self) -> Option<String> {
        self.metadata.as_ref().map(Value::to_string)
    }
}

/// An immutable entry in a job's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_card_id: i64,
    pub kind: JobEventKind,
    pub description: String,
    pub actor: Actor,
    pub metadata: Option<Value>,
    pub occurred_at: String,
}

impl JobEvent {
    /// The event recorded alongside a status change.
    #[must_use]
    pub fn status_change(change: &StatusChange) -> Self {
        let description = change.reason.as_ref().map_or_else(
            || format!("Status changed from {} to {}", change.from, change.to),
            |reason| {
                format!(
                    "Status changed from {} to {}: {reason}",
                    change.from, change.to
                )
            },
        );

        Self {
            job_card_id: change.job_card_id,
            kind: JobEventKind::StatusChange,
            description,
            actor: change.actor.clone(),
            metadata: Some(json!({
                "from_status": change.from.as_str(),
                "to_status": change.to.as_str(),
            })),
            occurred_at: change.occurred_at.clone(),
        }
    }

    /// The event recorded when parts are issued to a job.
    ///
    /// # Arguments
    ///
    /// * `usage` - The usage record created by the issue
    /// * `sku` - The issued variant's SKU
    /// * `actor` - Who issued the parts
    #[must_use]
    pub fn parts_issued(usage: &PartsUsage, sku: &str, actor: Actor) -> Self {
        Self {
            job_card_id: usage.job_card_id,
            kind: JobEventKind::PartsIssued,
            description: format!("Issued {} x {sku}", usage.quantity),
            actor,
            metadata: Some(json!({
                "usage_id": usage.usage_id,
                "variant_id": usage.variant_id,
                "quantity": usage.quantity,
                "unit_price_cents": usage.unit_price_cents,
                "total_price_cents": usage.total_price_cents,
            })),
            occurred_at: usage.issued_at.clone(),
        }
    }

    /// The event recorded when parts are returned from a job.
    ///
    /// # Arguments
    ///
    /// * `usage` - The usage record as it was before the return
    /// * `returned` - Quantity returned to stock
    /// * `reason` - Optional free-text reason
    /// * `actor` - Who returned the parts
    /// * `occurred_at` - Storage timestamp of the return
    #[must_use]
    pub fn parts_returned(
        usage: &PartsUsage,
        returned: u32,
        reason: Option<&str>,
        actor: Actor,
        occurred_at: String,
    ) -> Self {
        let remaining = usage.quantity.saturating_sub(returned);
        let description = reason.map_or_else(
            || format!("Returned {returned} of {} units", usage.quantity),
            |reason| format!("Returned {returned} of {} units: {reason}", usage.quantity),
        );

        Self {
            job_card_id: usage.job_card_id,
            kind: JobEventKind::PartsReturned,
            description,
            actor,
            metadata: Some(json!({
                "usage_id": usage.usage_id,
                "variant_id": usage.variant_id,
                "returned_quantity": returned,
                "remaining_quantity": remaining,
                "fully_returned": remaining == 0,
                "reason": reason,
            })),
            occurred_at,
        }
    }

    /// A caller-recorded event such as a note or a photo.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReservedJobEventType` if `kind` is one the core
    /// records itself.
    pub fn user_event(
        job_card_id: i64,
        kind: JobEventKind,
        description: String,
        actor: Actor,
        metadata: Option<Value>,
        occurred_at: String,
    ) -> Result<Self, DomainError> {
        if kind.is_reserved() {
            return Err(DomainError::ReservedJobEventType(kind.as_str().to_string()));
        }

        Ok(Self {
            job_card_id,
            kind,
            description,
            actor,
            metadata,
            occurred_at,
        })
    }

    /// Serialized metadata for storage.
    #[must_use]
    pub fn metadata_json(&self) -> Option<String> {
        self.metadata.as_ref().map(Value::to_string)
    }
}

#[cfg(test)]
mod tests;
