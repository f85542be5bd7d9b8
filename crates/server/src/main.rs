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
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod identity;
mod live;
mod scheduler;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};
use workbay_api::{
    AllowedTransitionsResponse, ApiError, EscalationScanResponse, IssuePartsRequest,
    JobHistoryResponse, JobPartsResponse, ListBatchesRequest, ListBatchesResponse,
    RecordJobEventRequest, RecordJobEventResponse, ReturnPartsRequest, ReturnPartsResponse,
    TransitionRequest, TransitionResponse, acknowledge_escalation, allowed_transitions,
    get_job_history, issue_parts, list_batches, list_job_parts, record_job_event,
    resolve_escalation, return_parts, transition_job,
};
use workbay_domain::{Escalation, PartsUsage, TransitionTable};
use workbay_persistence::Persistence;

use crate::identity::{Caller, SchedulerAuth};
use crate::live::NotificationBroadcaster;
use crate::scheduler::{ScanOutcome, run_guarded_scan, spawn_escalation_scheduler};

/// Workbay Server - HTTP server for the Workbay workshop core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Seconds between escalation scans. 0 disables the scheduler.
    #[arg(long, default_value_t = 300)]
    escalation_interval_secs: u64,

    /// Shared token the external scheduler presents to trigger scans.
    #[arg(long, env = "WORKBAY_SCHEDULER_TOKEN")]
    scheduler_token: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, one connection shared behind a lock.
    persistence: Arc<Mutex<Persistence>>,
    /// The job status transition table, built once at start.
    table: Arc<TransitionTable>,
    /// Post-commit notification fan-out.
    notifications: Arc<NotificationBroadcaster>,
    /// Token required on the internal scan endpoint.
    scheduler_token: Option<Arc<str>>,
    /// Held for the duration of an escalation scan.
    scan_guard: Arc<Mutex<()>>,
}

impl AppState {
    fn new(persistence: Persistence, scheduler_token: Option<String>) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            table: Arc::new(TransitionTable::standard()),
            notifications: Arc::new(NotificationBroadcaster::new()),
            scheduler_token: scheduler_token.map(Arc::from),
            scan_guard: Arc::new(Mutex::new(())),
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Structured detail for errors clients act on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    details: Option<Value>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.to_string();
        match err {
            ApiError::Unauthorized { .. } => Self::new(StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden { .. } => Self::new(StatusCode::FORBIDDEN, message),
            ApiError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, message),
            ApiError::InvalidTransition { from, to, allowed } => Self {
                status: StatusCode::CONFLICT,
                message,
                details: Some(json!({ "from": from, "to": to, "allowed": allowed })),
            },
            ApiError::InsufficientStock {
                variant_id,
                requested,
                available,
            } => Self {
                status: StatusCode::CONFLICT,
                message,
                details: Some(json!({
                    "variant_id": variant_id,
                    "requested": requested,
                    "available": available,
                })),
            },
            ApiError::InvalidRequest { field, .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message,
                details: Some(json!({ "field": field })),
            },
            ApiError::Internal { .. } => {
                error!(error = %message, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

/// Handler for POST `/jobs/{job_card_id}/transition`.
async fn handle_transition_job(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, HttpError> {
    info!(job_card_id, to = %request.to_status, "Handling transition_job request");

    let mut persistence = app_state.persistence.lock().await;
    let response: TransitionResponse = transition_job(
        &mut persistence,
        app_state.notifications.as_ref(),
        &app_state.table,
        &caller,
        job_card_id,
        &request,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/jobs/{job_card_id}/transitions`.
async fn handle_allowed_transitions(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
) -> Result<Json<AllowedTransitionsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = allowed_transitions(&mut persistence, &app_state.table, &caller, job_card_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/jobs/{job_card_id}/history`.
async fn handle_get_job_history(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
) -> Result<Json<JobHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = get_job_history(&mut persistence, &caller, job_card_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/jobs/{job_card_id}/events`.
async fn handle_record_job_event(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
    Json(request): Json<RecordJobEventRequest>,
) -> Result<(StatusCode, Json<RecordJobEventResponse>), HttpError> {
    info!(job_card_id, event_type = %request.event_type, "Handling record_job_event request");

    let mut persistence = app_state.persistence.lock().await;
    let response = record_job_event(
        &mut persistence,
        &caller,
        job_card_id,
        &request,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/jobs/{job_card_id}/parts`.
async fn handle_issue_parts(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
    Json(request): Json<IssuePartsRequest>,
) -> Result<(StatusCode, Json<PartsUsage>), HttpError> {
    info!(
        job_card_id,
        variant_id = request.variant_id,
        quantity = request.quantity,
        "Handling issue_parts request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let usage: PartsUsage = issue_parts(
        &mut persistence,
        app_state.notifications.as_ref(),
        &caller,
        job_card_id,
        &request,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(usage)))
}

/// Handler for GET `/jobs/{job_card_id}/parts`.
async fn handle_list_job_parts(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(job_card_id): Path<i64>,
) -> Result<Json<JobPartsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = list_job_parts(&mut persistence, &caller, job_card_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/parts-usage/{usage_id}/return`.
async fn handle_return_parts(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(usage_id): Path<i64>,
    Json(request): Json<ReturnPartsRequest>,
) -> Result<Json<ReturnPartsResponse>, HttpError> {
    info!(usage_id, quantity = request.quantity, "Handling return_parts request");

    let mut persistence = app_state.persistence.lock().await;
    let response = return_parts(
        &mut persistence,
        app_state.notifications.as_ref(),
        &caller,
        usage_id,
        &request,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/batches`.
async fn handle_list_batches(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Query(request): Query<ListBatchesRequest>,
) -> Result<Json<ListBatchesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = list_batches(&mut persistence, &caller, &request)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/internal/escalation-scan`.
async fn handle_escalation_scan(
    AxumState(app_state): AxumState<AppState>,
    _auth: SchedulerAuth,
) -> Result<Json<EscalationScanResponse>, HttpError> {
    info!("Handling escalation scan request");

    match run_guarded_scan(&app_state, OffsetDateTime::now_utc()).await? {
        ScanOutcome::Completed(response) => Ok(Json(response)),
        ScanOutcome::Skipped => Err(HttpError::new(
            StatusCode::CONFLICT,
            String::from("An escalation scan is already running"),
        )),
    }
}

/// Handler for POST `/escalations/{escalation_id}/acknowledge`.
async fn handle_acknowledge_escalation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(escalation_id): Path<i64>,
) -> Result<Json<Escalation>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let escalation = acknowledge_escalation(
        &mut persistence,
        &caller,
        escalation_id,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(escalation))
}

/// Handler for POST `/escalations/{escalation_id}/resolve`.
async fn handle_resolve_escalation(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller): Caller,
    Path(escalation_id): Path<i64>,
) -> Result<Json<Escalation>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let escalation = resolve_escalation(
        &mut persistence,
        &caller,
        escalation_id,
        OffsetDateTime::now_utc(),
    )?;
    drop(persistence);

    Ok(Json(escalation))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/jobs/{job_card_id}/transition", post(handle_transition_job))
        .route(
            "/jobs/{job_card_id}/transitions",
            get(handle_allowed_transitions),
        )
        .route("/jobs/{job_card_id}/history", get(handle_get_job_history))
        .route("/jobs/{job_card_id}/events", post(handle_record_job_event))
        .route(
            "/jobs/{job_card_id}/parts",
            post(handle_issue_parts).get(handle_list_job_parts),
        )
        .route("/parts-usage/{usage_id}/return", post(handle_return_parts))
        .route("/batches", get(handle_list_batches))
        .route("/internal/escalation-scan", post(handle_escalation_scan))
        .route(
            "/escalations/{escalation_id}/acknowledge",
            post(handle_acknowledge_escalation),
        )
        .route(
            "/escalations/{escalation_id}/resolve",
            post(handle_resolve_escalation),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Workbay Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState::new(persistence, args.scheduler_token);

    if args.escalation_interval_secs == 0 {
        info!("Escalation scheduler disabled");
    } else {
        spawn_escalation_scheduler(
            app_state.clone(),
            std::time::Duration::from_secs(args.escalation_interval_secs),
        );
    }

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
