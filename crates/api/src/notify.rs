// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-commit notifications.
//!
//! Notifications are published only after a unit of work commits and carry
//! no delivery guarantee. A failing sink is logged and otherwise ignored.

use serde::{Deserialize, Serialize};
use tracing::warn;
use workbay_domain::JobStatus;

/// A change worth telling connected clients about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    JobStatusChanged {
        dealer_id: i64,
        job_card_id: i64,
        job_number: String,
        from: JobStatus,
        to: JobStatus,
        actor_id: String,
    },
    PartsIssued {
        dealer_id: i64,
        job_card_id: i64,
        usage_id: i64,
        variant_id: i64,
        quantity: u32,
    },
    PartsReturned {
        dealer_id: i64,
        job_card_id: i64,
        usage_id: i64,
        returned_quantity: u32,
        fully_returned: bool,
    },
    EscalationRaised {
        dealer_id: i64,
        escalation_id: i64,
        rule_id: i64,
        entity_type: String,
        entity_id: i64,
        reason: String,
    },
}

impl Notification {
    /// The event name clients subscribe to.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JobStatusChanged { .. } => "job_status_changed",
            Self::PartsIssued { .. } => "parts_issued",
            Self::PartsReturned { .. } => "parts_returned",
            Self::EscalationRaised { .. } => "escalation_raised",
        }
    }

    /// The dealer the notification is scoped to.
    #[must_use]
    pub const fn dealer_id(&self) -> i64 {
        match self {
            Self::JobStatusChanged { dealer_id, .. }
            | Self::PartsIssued { dealer_id, .. }
            | Self::PartsReturned { dealer_id, .. }
            | Self::EscalationRaised { dealer_id, .. } => *dealer_id,
        }
    }
}

/// A sink refused a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub reason: String,
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Notification not delivered: {}", self.reason)
    }
}

impl std::error::Error for NotifyError {}

/// Destination for post-commit notifications.
pub trait NotificationSink: Send + Sync {
    /// Hands a notification to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejected it. Callers never
    /// propagate this error.
    fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Publishes a notification, logging and discarding any failure.
pub(crate) fn publish_best_effort(sink: &dyn NotificationSink, notification: Notification) {
    let event: &'static str = notification.event_name();
    let dealer_id: i64 = notification.dealer_id();
    if let Err(e) = sink.publish(notification) {
        warn!(event, dealer_id, error = %e, "Dropped notification");
    }
}
