// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::TransitionCommand;
use crate::error::CoreError;
use crate::state::TransitionResult;
use workbay_audit::{JobEvent, StatusChange};
use workbay_domain::{JobCard, JobStatus, TransitionTable};

/// Applies a status transition to a job card.
///
/// Produces the updated job card together with the history entry and job
/// event that must be committed in the same unit of work.
///
/// `service_started_at` is stamped the first time the job enters
/// `in_progress`. `service_ended_at` is stamped whenever it enters
/// `completed` or `delivered`.
///
/// # Arguments
///
/// * `table` - The transition table to validate against
/// * `job` - The current job card (immutable)
/// * `command` - The requested status, actor, reason and metadata
/// * `now` - Storage timestamp of the transition
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` (wrapped) if the requested
/// status is not a legal successor of the job's current status.
pub fn apply_transition(
    table: &TransitionTable,
    job: &JobCard,
    command: TransitionCommand,
    now: &str,
) -> Result<TransitionResult, CoreError> {
    let from: JobStatus = job.status;
    let to: JobStatus = command.to;
    table.validate(from, to)?;

    let mut new_job: JobCard = job.clone();
    new_job.status = to;
    new_job.updated_at = now.to_string();

    if to == JobStatus::InProgress && new_job.service_started_at.is_none() {
        new_job.service_started_at = Some(now.to_string());
    }
    if to.ends_service() {
        new_job.service_ended_at = Some(now.to_string());
    }

    let status_change: StatusChange = StatusChange::new(
        job.job_card_id,
        from,
        to,
        command.actor,
        command.reason,
        command.metadata,
        now.to_string(),
    );
    let event: JobEvent = JobEvent::status_change(&status_change);

    Ok(TransitionResult {
        new_job,
        status_change,
        event,
    })
}
