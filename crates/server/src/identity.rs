// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity extraction.
//!
//! Identity is resolved by the upstream gateway and forwarded as trusted
//! headers. These extractors only parse and validate them.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
};
use tracing::{debug, warn};
use workbay_api::{ApiError, CallerContext, authenticate};

use crate::{AppState, HttpError};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const DEALER_ID_HEADER: &str = "x-dealer-id";
pub const ROLE_HEADER: &str = "x-role";
pub const SCHEDULER_TOKEN_HEADER: &str = "x-scheduler-token";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Extractor for the authenticated caller.
///
/// Rejects with 401 if any identity header is missing or malformed.
pub struct Caller(pub CallerContext);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller: CallerContext = authenticate(
            header(&parts.headers, USER_ID_HEADER),
            header(&parts.headers, DEALER_ID_HEADER),
            header(&parts.headers, ROLE_HEADER),
        )
        .map_err(|e| {
            debug!(error = %e, "Caller identity rejected");
            HttpError::from(ApiError::from(e))
        })?;

        Ok(Self(caller))
    }
}

/// Extractor proving the request came from the scheduler.
///
/// Rejects with 401 unless a scheduler token is configured and the
/// request carries it.
pub struct SchedulerAuth;

impl FromRequestParts<AppState> for SchedulerAuth {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.scheduler_token.as_deref() else {
            warn!("Escalation scan requested but no scheduler token is configured");
            return Err(HttpError::new(
                StatusCode::UNAUTHORIZED,
                String::from("Scheduler access is not configured"),
            ));
        };

        if header(&parts.headers, SCHEDULER_TOKEN_HEADER) != Some(expected) {
            warn!("Escalation scan requested with an invalid scheduler token");
            return Err(HttpError::new(
                StatusCode::UNAUTHORIZED,
                String::from("Invalid scheduler token"),
            ));
        }

        Ok(Self)
    }
}
