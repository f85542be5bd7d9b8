// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job card mutations: intake, status transitions and the event log.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use workbay::{CoreError, TransitionCommand, TransitionResult, apply_transition};
use workbay_audit::{JobEvent, StatusChange};
use workbay_domain::{JobCard, JobStatus, TransitionTable, normalize_timestamp};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewJobCard;
use crate::diesel_schema::{job_cards, job_events, job_status_history};
use crate::error::PersistenceError;
use crate::queries::jobs::get_job_card;

/// Registers a job card in the initial status.
///
/// `created_at` may carry any RFC 3339 offset; it is stored in UTC storage
/// format because breach detection compares it as text.
///
/// # Errors
///
/// Returns `PersistenceError::Rejected` if `created_at` is not an RFC 3339
/// timestamp, or an error if the insert fails (for example a duplicate job
/// number within the dealer).
pub fn create_job_card(
    conn: &mut SqliteConnection,
    job: &NewJobCard,
) -> Result<JobCard, PersistenceError> {
    let created_at: String = normalize_timestamp(&job.created_at).map_err(CoreError::from)?;

    diesel::insert_into(job_cards::table)
        .values((
            job_cards::dealer_id.eq(job.dealer_id),
            job_cards::job_number.eq(&job.job_number),
            job_cards::status.eq(JobStatus::initial().as_str()),
            job_cards::technician_id.eq(job.technician_id),
            job_cards::created_at.eq(&created_at),
            job_cards::updated_at.eq(&created_at),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_job_card: {e}")))?;

    let job_card_id: i64 = get_last_insert_rowid(conn)?;
    info!(job_card_id, dealer_id = job.dealer_id, "Created job card");

    get_job_card(conn, job_card_id)
}

/// Appends a status history entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_status_change(
    conn: &mut SqliteConnection,
    change: &StatusChange,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(job_status_history::table)
        .values((
            job_status_history::job_card_id.eq(change.job_card_id),
            job_status_history::from_status.eq(change.from.as_str()),
            job_status_history::to_status.eq(change.to.as_str()),
            job_status_history::actor_id.eq(&change.actor.id),
            job_status_history::reason.eq(change.reason.as_deref()),
            job_status_history::metadata_json.eq(change.metadata_json()),
            job_status_history::created_at.eq(&change.occurred_at),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("insert_status_change: {e}")))?;

    get_last_insert_rowid(conn)
}

/// Appends a job event.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_job_event(
    conn: &mut SqliteConnection,
    event: &JobEvent,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(job_events::table)
        .values((
            job_events::job_card_id.eq(event.job_card_id),
            job_events::event_type.eq(event.kind.as_str()),
            job_events::description.eq(&event.description),
            job_events::actor_id.eq(&event.actor.id),
            job_events::metadata_json.eq(event.metadata_json()),
            job_events::created_at.eq(&event.occurred_at),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("insert_job_event: {e}")))?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!(event_id, job_card_id = event.job_card_id, kind = %event.kind, "Appended job event");
    Ok(event_id)
}

/// Moves a job card to a new status as one unit of work.
///
/// The job is re-read under the write lock, validated against `table`, and
/// the status update, history entry and status event are committed
/// together.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `table` - The transition table to validate against
/// * `job_card_id` - The job to transition
/// * `command` - The requested status, actor, reason and metadata
/// * `now` - Storage timestamp of the transition
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the job does not exist,
/// `PersistenceError::Rejected` if the transition is not permitted, or a
/// database error. Nothing is written on error.
pub fn transition_job(
    conn: &mut SqliteConnection,
    table: &TransitionTable,
    job_card_id: i64,
    command: TransitionCommand,
    now: &str,
) -> Result<TransitionResult, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let job: JobCard = get_job_card(conn, job_card_id)?;
        let result: TransitionResult = apply_transition(table, &job, command, now)?;

        diesel::update(job_cards::table.filter(job_cards::job_card_id.eq(job_card_id)))
            .set((
                job_cards::status.eq(result.new_job.status.as_str()),
                job_cards::updated_at.eq(&result.new_job.updated_at),
                job_cards::service_started_at.eq(result.new_job.service_started_at.as_deref()),
                job_cards::service_ended_at.eq(result.new_job.service_ended_at.as_deref()),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("transition_job: {e}")))?;

        let history_id: i64 = insert_status_change(conn, &result.status_change)?;
        insert_job_event(conn, &result.event)?;

        info!(
            job_card_id,
            history_id,
            from = %result.status_change.from,
            to = %result.status_change.to,
            "Transitioned job card"
        );

        Ok(result)
    })
}

/// Appends a caller-recorded event to an existing job.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the job does not exist, or a
/// database error.
pub fn record_job_event(
    conn: &mut SqliteConnection,
    event: &JobEvent,
) -> Result<i64, PersistenceError> {
    conn.immediate_transaction(|conn| {
        get_job_card(conn, event.job_card_id)?;
        insert_job_event(conn, event)
    })
}
