// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Periodic escalation scanning.
//!
//! Scans are single-flight: a tick that finds a scan already running is
//! skipped rather than queued.

use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use workbay_api::{ApiError, EscalationScanResponse, run_escalation_scan};

use crate::AppState;

/// Outcome of one scan attempt.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(EscalationScanResponse),
    /// Another scan held the guard.
    Skipped,
}

/// Runs one escalation scan unless another is already in flight.
///
/// # Errors
///
/// Returns an error if the scan itself fails.
pub async fn run_guarded_scan(
    state: &AppState,
    now: OffsetDateTime,
) -> Result<ScanOutcome, ApiError> {
    let Ok(_guard) = state.scan_guard.try_lock() else {
        warn!("Escalation scan already running, skipping");
        return Ok(ScanOutcome::Skipped);
    };

    let mut persistence = state.persistence.lock().await;
    let response: EscalationScanResponse =
        run_escalation_scan(&mut persistence, state.notifications.as_ref(), now)?;
    drop(persistence);

    Ok(ScanOutcome::Completed(response))
}

/// Spawns the background scan loop.
///
/// The first scan runs one full period after start.
pub fn spawn_escalation_scheduler(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "Escalation scheduler started");

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match run_guarded_scan(&state, OffsetDateTime::now_utc()).await {
                Ok(ScanOutcome::Completed(response)) => {
                    info!(raised = response.count, "Scheduled escalation scan finished");
                }
                Ok(ScanOutcome::Skipped) => {}
                Err(e) => error!(error = %e, "Scheduled escalation scan failed"),
            }
        }
    })
}
