// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job card and job audit trail queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use workbay_domain::{JobCard, JobStatus};

use crate::data_models::{
    JobCardRow, JobEventRecord, JobEventRow, StatusHistoryRecord, StatusHistoryRow,
};
use crate::diesel_schema::{job_cards, job_events, job_status_history};
use crate::error::PersistenceError;

/// Retrieves a job card by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `job_card_id` - The job card ID
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the job card does not exist.
pub fn get_job_card(
    conn: &mut SqliteConnection,
    job_card_id: i64,
) -> Result<JobCard, PersistenceError> {
    let row: Option<JobCardRow> = job_cards::table
        .filter(job_cards::job_card_id.eq(job_card_id))
        .select(JobCardRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_job_card: {e}")))?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("job card {job_card_id}")))?
        .try_into()
}

/// Lists a job's status history, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_status_history(
    conn: &mut SqliteConnection,
    job_card_id: i64,
) -> Result<Vec<StatusHistoryRecord>, PersistenceError> {
    let rows: Vec<StatusHistoryRow> = job_status_history::table
        .filter(job_status_history::job_card_id.eq(job_card_id))
        .order(job_status_history::history_id.asc())
        .select(StatusHistoryRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_status_history: {e}")))?;

    rows.into_iter().map(StatusHistoryRecord::try_from).collect()
}

/// Lists a job's events, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn get_job_events(
    conn: &mut SqliteConnection,
    job_card_id: i64,
) -> Result<Vec<JobEventRecord>, PersistenceError> {
    let rows: Vec<JobEventRow> = job_events::table
        .filter(job_events::job_card_id.eq(job_card_id))
        .order(job_events::event_id.asc())
        .select(JobEventRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_job_events: {e}")))?;

    rows.into_iter().map(JobEventRecord::try_from).collect()
}

/// Finds a dealer's in-progress jobs created before `threshold`.
///
/// Jobs whose IDs appear in `exclude` are skipped.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `dealer_id` - The dealer scope
/// * `threshold` - Storage timestamp; only jobs created strictly earlier match
/// * `exclude` - Job card IDs to skip
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn find_breaching_jobs(
    conn: &mut SqliteConnection,
    dealer_id: i64,
    threshold: &str,
    exclude: &[i64],
) -> Result<Vec<JobCard>, PersistenceError> {
    let rows: Vec<JobCardRow> = job_cards::table
        .filter(job_cards::dealer_id.eq(dealer_id))
        .filter(job_cards::status.eq(JobStatus::InProgress.as_str()))
        .filter(job_cards::created_at.lt(threshold))
        .filter(job_cards::job_card_id.ne_all(exclude))
        .order(job_cards::job_card_id.asc())
        .select(JobCardRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("find_breaching_jobs: {e}")))?;

    debug!(
        dealer_id,
        threshold,
        excluded = exclude.len(),
        matched = rows.len(),
        "Breaching job lookup"
    );

    rows.into_iter().map(JobCard::try_from).collect()
}
