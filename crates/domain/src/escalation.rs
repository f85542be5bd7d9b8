// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Escalation rule condition payloads.

use crate::error::DomainError;
use serde::Deserialize;
use time::Duration;

/// Threshold applied when a rule's condition does not name one.
pub const DEFAULT_THRESHOLD_HOURS: f64 = 4.0;

/// Largest accepted threshold, one leap year.
pub const MAX_THRESHOLD_HOURS: f64 = 24.0 * 366.0;

#[derive(Debug, Deserialize)]
struct RawCondition {
    threshold_hours: Option<f64>,
}

/// Parsed condition of a `time_breach` rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationCondition {
    threshold_hours: f64,
}

impl EscalationCondition {
    /// Parses a rule condition payload.
    ///
    /// An empty payload, `null`, or an object without `threshold_hours`
    /// yields the default threshold.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEscalationCondition` if the payload is
    /// not a JSON object or the threshold is not a positive number of at
    /// most [`MAX_THRESHOLD_HOURS`].
    pub fn from_json(payload: &str) -> Result<Self, DomainError> {
        let trimmed = payload.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }

        let raw: RawCondition =
            serde_json::from_str(trimmed).map_err(|e| DomainError::InvalidEscalationCondition {
                reason: e.to_string(),
            })?;

        match raw.threshold_hours {
            None => Ok(Self::default()),
            Some(hours) if hours > 0.0 && hours <= MAX_THRESHOLD_HOURS => Ok(Self {
                threshold_hours: hours,
            }),
            Some(hours) => Err(DomainError::InvalidEscalationCondition {
                reason: format!(
                    "threshold_hours must be in (0, {MAX_THRESHOLD_HOURS}], got {hours}"
                ),
            }),
        }
    }

    #[must_use]
    pub const fn threshold_hours(&self) -> f64 {
        self.threshold_hours
    }

    /// The threshold as a duration.
    ///
    /// Saturates rather than panicking; parsed conditions never exceed
    /// [`MAX_THRESHOLD_HOURS`].
    #[must_use]
    pub fn threshold(&self) -> Duration {
        Duration::saturating_seconds_f64(self.threshold_hours * 3600.0)
    }
}

impl Default for EscalationCondition {
    fn default() -> Self {
        Self {
            threshold_hours: DEFAULT_THRESHOLD_HOURS,
        }
    }
}
