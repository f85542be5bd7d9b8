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

mod auth;
mod error;
mod handlers;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use auth::{AuthorizationService, CallerContext, Role, authenticate};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    acknowledge_escalation, allowed_transitions, get_job_history, issue_parts, list_batches,
    list_job_parts, record_job_event, resolve_escalation, return_parts, run_escalation_scan,
    transition_job,
};
pub use notify::{Notification, NotificationSink, NotifyError};
pub use request_response::{
    AllowedTransitionsResponse, EscalationScanResponse, IssuePartsRequest, JobHistoryResponse,
    JobPartsResponse, ListBatchesRequest, ListBatchesResponse, RecordJobEventRequest,
    RecordJobEventResponse, ReturnPartsRequest, ReturnPartsResponse, TransitionRequest,
    TransitionResponse,
};
