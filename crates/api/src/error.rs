// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use workbay::CoreError;
use workbay_domain::{DomainError, JobStatus};
use workbay_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller's identity is missing or malformed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The caller may not perform the action.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: '{action}': {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No valid caller identity.
    Unauthorized {
        /// The reason authentication failed.
        reason: String,
    },
    /// The caller may not act on the target record.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why it was refused.
        reason: String,
    },
    /// A referenced record does not exist.
    NotFound {
        /// Description of the missing record.
        resource: String,
    },
    /// The requested status change is not in the transition table.
    InvalidTransition {
        /// The job's current status.
        from: JobStatus,
        /// The requested status.
        to: JobStatus,
        /// The legal successors of `from`.
        allowed: Vec<JobStatus>,
    },
    /// Not enough stock to satisfy an issue.
    InsufficientStock {
        /// The variant being issued.
        variant_id: i64,
        /// The quantity requested.
        requested: u32,
        /// The quantity in stock.
        available: u32,
    },
    /// The request failed validation.
    InvalidRequest {
        /// The offending field.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// An infrastructure failure. The unit of work was rolled back.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { reason } => write!(f, "Unauthorized: {reason}"),
            Self::Forbidden { action, reason } => write!(f, "Forbidden: '{action}': {reason}"),
            Self::NotFound { resource } => write!(f, "Not found: {resource}"),
            Self::InvalidTransition { from, to, allowed } => {
                let allowed: Vec<&str> = allowed.iter().map(JobStatus::as_str).collect();
                write!(
                    f,
                    "Cannot transition job from '{from}' to '{to}'. Allowed: {}",
                    if allowed.is_empty() {
                        String::from("none")
                    } else {
                        allowed.join(", ")
                    }
                )
            }
            Self::InsufficientStock {
                variant_id,
                requested,
                available,
            } => write!(
                f,
                "Insufficient stock for variant {variant_id}: requested {requested}, available {available}"
            ),
            Self::InvalidRequest { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::Unauthorized { reason },
            AuthError::Forbidden { action, reason } => Self::Forbidden { action, reason },
        }
    }
}

fn invalid(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidRequest {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTransition { from, to, allowed } => {
            ApiError::InvalidTransition { from, to, allowed }
        }
        DomainError::InsufficientStock {
            variant_id,
            requested,
            available,
        } => ApiError::InsufficientStock {
            variant_id,
            requested,
            available,
        },
        DomainError::DealerMismatch { .. } => ApiError::Forbidden {
            action: String::from("issue_parts"),
            reason: err.to_string(),
        },
        DomainError::InvalidJobStatus { .. } => invalid("to_status", &err),
        DomainError::InvalidQuantity { .. }
        | DomainError::OverReturn { .. }
        | DomainError::PriceOverflow { .. }
        | DomainError::StockOverflow { .. } => invalid("quantity", &err),
        DomainError::InvalidCostBasisStrategy(_) => invalid("strategy", &err),
        DomainError::InvalidBatchStatus(_)
        | DomainError::InvalidEscalationStatus(_)
        | DomainError::InvalidEscalationTransition { .. } => invalid("status", &err),
        DomainError::InvalidEscalationCondition { .. } => invalid("condition_json", &err),
        DomainError::InvalidJobEventType(_) | DomainError::ReservedJobEventType(_) => {
            invalid("event_type", &err)
        }
        DomainError::InvalidTimestamp { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Rule violations detected inside a unit of work keep their meaning.
/// Everything else is an internal failure.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(resource) => ApiError::NotFound { resource },
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
