// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::state::NewEscalation;
use time::OffsetDateTime;
use workbay_domain::{
    ENTITY_TYPE_JOB_CARD, EscalationCondition, EscalationRule, EscalationStatus, JobCard,
    format_timestamp,
};

/// Level assigned to every escalation raised by the scan.
pub const INITIAL_ESCALATION_LEVEL: u8 = 1;

/// Computes the instant before which an in-progress job breaches a rule.
///
/// The result is a storage timestamp suitable for comparison against
/// `created_at`.
///
/// # Errors
///
/// Returns an error if the threshold instant cannot be represented.
pub fn escalation_threshold(
    condition: &EscalationCondition,
    now: OffsetDateTime,
) -> Result<String, CoreError> {
    let threshold_instant: OffsetDateTime = now.saturating_sub(condition.threshold());
    Ok(format_timestamp(threshold_instant)?)
}

/// Plans the escalation raised when `job` breaches `rule`.
///
/// # Arguments
///
/// * `rule` - The breached rule
/// * `job` - The breaching job card
/// * `condition` - The rule's parsed condition
/// * `now` - The scan time
///
/// # Errors
///
/// Returns an error if `now` cannot be formatted as a storage timestamp.
pub fn plan_escalation(
    rule: &EscalationRule,
    job: &JobCard,
    condition: &EscalationCondition,
    now: OffsetDateTime,
) -> Result<NewEscalation, CoreError> {
    let reason: String = format!(
        "Job {} has been in progress for more than {} hours (rule '{}')",
        job.job_number,
        condition.threshold_hours(),
        rule.name
    );

    Ok(NewEscalation {
        dealer_id: rule.dealer_id,
        rule_id: rule.rule_id,
        entity_type: ENTITY_TYPE_JOB_CARD,
        entity_id: job.job_card_id,
        level: INITIAL_ESCALATION_LEVEL,
        reason,
        status: EscalationStatus::Active,
        created_at: format_timestamp(now)?,
    })
}
