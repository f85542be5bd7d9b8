// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use workbay_api::{CallerContext, Role, TransitionRequest, transition_job};
use workbay_domain::{EscalationTrigger, JobCard, PartVariant};
use workbay_persistence::{NewEscalationRule, NewJobCard, NewPartVariant, Persistence};

use crate::AppState;

pub const DEALER_ID: i64 = 10;
pub const OTHER_DEALER_ID: i64 = 20;
pub const SCHEDULER_TOKEN: &str = "scan-secret";

/// Well in the past so scans against the wall clock always see a breach.
pub const LONG_AGO: &str = "2020-01-01T08:00:00Z";

pub fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState::new(persistence, Some(String::from(SCHEDULER_TOKEN)))
}

pub async fn seed_job(app_state: &AppState, job_number: &str, created_at: &str) -> JobCard {
    let mut persistence = app_state.persistence.lock().await;
    persistence
        .create_job_card(&NewJobCard {
            dealer_id: DEALER_ID,
            job_number: job_number.to_string(),
            technician_id: Some(42),
            created_at: created_at.to_string(),
        })
        .unwrap()
}

pub async fn seed_variant(app_state: &AppState, stock_quantity: u32) -> PartVariant {
    let mut persistence = app_state.persistence.lock().await;
    persistence
        .create_part_variant(&NewPartVariant {
            dealer_id: DEALER_ID,
            part_id: 500,
            sku: String::from("WIPER-22"),
            stock_quantity,
            price_cents: 1_800,
        })
        .unwrap()
}

pub async fn seed_rule(app_state: &AppState) {
    let mut persistence = app_state.persistence.lock().await;
    persistence
        .create_escalation_rule(&NewEscalationRule {
            dealer_id: DEALER_ID,
            name: String::from("Stalled in bay"),
            trigger: EscalationTrigger::TimeBreach,
            condition_json: String::from(r#"{"threshold_hours": 4}"#),
            action: String::from("notify_manager"),
            is_active: true,
        })
        .unwrap();
}

/// Walks a job through the standard lifecycle up to `in_progress`.
pub async fn advance_to_in_progress(app_state: &AppState, job_card_id: i64) {
    let caller = CallerContext::new(String::from("tech-42"), DEALER_ID, Role::Technician);
    let mut persistence = app_state.persistence.lock().await;
    for status in ["diagnosed", "estimate_sent", "customer_approved", "in_progress"] {
        transition_job(
            &mut persistence,
            app_state.notifications.as_ref(),
            &app_state.table,
            &caller,
            job_card_id,
            &TransitionRequest {
                to_status: status.to_string(),
                reason: None,
                metadata: None,
            },
            OffsetDateTime::now_utc(),
        )
        .unwrap();
    }
}

/// Builds a request carrying caller identity headers.
pub fn request_as(
    method: &str,
    uri: &str,
    dealer_id: i64,
    role: &str,
    body: Option<&Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "user-1")
        .header("x-dealer-id", dealer_id.to_string())
        .header("x-role", role);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
