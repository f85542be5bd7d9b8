// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API operations.
//!
//! Every operation authorizes the caller against the owning dealer before
//! any write, delegates the unit of work to persistence, and publishes
//! notifications only after the unit of work has committed.

use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{info, warn};
use workbay::{TransitionCommand, TransitionResult, escalation_threshold, plan_escalation};
use workbay_audit::{JobEvent, JobEventKind};
use workbay_domain::{
    CostBasisStrategy, ENTITY_TYPE_JOB_CARD, Escalation, EscalationCondition, EscalationRule,
    EscalationStatus, EscalationTrigger, JobCard, JobStatus, PartVariant, PartsUsage,
    TransitionTable, format_timestamp,
};
use workbay_persistence::Persistence;

use crate::auth::{AuthorizationService, CallerContext};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notify::{Notification, NotificationSink, publish_best_effort};
use crate::request_response::{
    AllowedTransitionsResponse, EscalationScanResponse, IssuePartsRequest, JobHistoryResponse,
    JobPartsResponse, ListBatchesRequest, ListBatchesResponse, RecordJobEventRequest,
    RecordJobEventResponse, ReturnPartsRequest, ReturnPartsResponse, TransitionRequest,
    TransitionResponse,
};

fn timestamp(now: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(now).map_err(translate_domain_error)
}

fn require_positive_quantity(quantity: u32) -> Result<(), ApiError> {
    if quantity == 0 {
        return Err(ApiError::InvalidRequest {
            field: String::from("quantity"),
            message: String::from("Quantity must be greater than 0"),
        });
    }
    Ok(())
}

/// Loads a job and checks the caller may act on it.
fn load_authorized_job(
    persistence: &mut Persistence,
    caller: &CallerContext,
    job_card_id: i64,
    action: &str,
) -> Result<JobCard, ApiError> {
    let job: JobCard = persistence
        .get_job_card(job_card_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_dealer(caller, job.dealer_id, action)?;
    Ok(job)
}

/// Moves a job card to a new status.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `sink` - Destination for the post-commit notification
/// * `table` - The transition table to validate against
/// * `caller` - The authenticated caller
/// * `job_card_id` - The job to transition
/// * `request` - The target status, reason and metadata
/// * `now` - The current instant
///
/// # Errors
///
/// Returns `ApiError::InvalidRequest` for an unknown status name,
/// `ApiError::NotFound`, `ApiError::Forbidden`, or
/// `ApiError::InvalidTransition` carrying the legal successors.
pub fn transition_job(
    persistence: &mut Persistence,
    sink: &dyn NotificationSink,
    table: &TransitionTable,
    caller: &CallerContext,
    job_card_id: i64,
    request: &TransitionRequest,
    now: OffsetDateTime,
) -> Result<TransitionResponse, ApiError> {
    let to: JobStatus = JobStatus::from_str(&request.to_status).map_err(translate_domain_error)?;
    let job: JobCard = load_authorized_job(persistence, caller, job_card_id, "transition_job")?;

    let mut command: TransitionCommand = TransitionCommand::new(to, caller.to_audit_actor());
    if let Some(reason) = &request.reason {
        command = command.with_reason(reason.clone());
    }
    if let Some(metadata) = &request.metadata {
        command = command.with_metadata(metadata.clone());
    }

    let result: TransitionResult = persistence
        .transition_job(table, job_card_id, command, &timestamp(now)?)
        .map_err(translate_persistence_error)?;

    let from: JobStatus = result.status_change.from;
    info!(
        job_card_id,
        dealer_id = job.dealer_id,
        from = %from,
        to = %to,
        actor = %caller.user_id,
        "Job status changed"
    );

    publish_best_effort(
        sink,
        Notification::JobStatusChanged {
            dealer_id: result.new_job.dealer_id,
            job_card_id,
            job_number: result.new_job.job_number.clone(),
            from,
            to,
            actor_id: caller.user_id.clone(),
        },
    );

    Ok(TransitionResponse {
        job_card_id,
        previous_status: from,
        status: result.new_job.status,
    })
}

/// Lists the statuses a job may move to next.
///
/// # Errors
///
/// Returns `ApiError::NotFound` or `ApiError::Forbidden`.
pub fn allowed_transitions(
    persistence: &mut Persistence,
    table: &TransitionTable,
    caller: &CallerContext,
    job_card_id: i64,
) -> Result<AllowedTransitionsResponse, ApiError> {
    let job: JobCard = load_authorized_job(persistence, caller, job_card_id, "allowed_transitions")?;

    Ok(AllowedTransitionsResponse {
        job_card_id,
        status: job.status,
        allowed: table.successors(job.status).to_vec(),
    })
}

/// Issues parts from a variant's stock to a job.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `sink` - Destination for the post-commit notification
/// * `caller` - The authenticated caller
/// * `job_card_id` - The receiving job
/// * `request` - The variant and quantity
/// * `now` - The current instant
///
/// # Errors
///
/// Returns `ApiError::InvalidRequest` for a zero quantity,
/// `ApiError::NotFound`, `ApiError::Forbidden` (including a variant from
/// another dealer), or `ApiError::InsufficientStock`.
pub fn issue_parts(
    persistence: &mut Persistence,
    sink: &dyn NotificationSink,
    caller: &CallerContext,
    job_card_id: i64,
    request: &IssuePartsRequest,
    now: OffsetDateTime,
) -> Result<PartsUsage, ApiError> {
    require_positive_quantity(request.quantity)?;
    let job: JobCard = load_authorized_job(persistence, caller, job_card_id, "issue_parts")?;

    let variant: PartVariant = persistence
        .get_part_variant(request.variant_id)
        .map_err(translate_persistence_error)?;
    if variant.dealer_id != job.dealer_id {
        return Err(ApiError::Forbidden {
            action: String::from("issue_parts"),
            reason: format!(
                "variant {} does not belong to dealer {}",
                variant.variant_id, job.dealer_id
            ),
        });
    }

    let usage: PartsUsage = persistence
        .issue_parts(
            job_card_id,
            request.variant_id,
            request.quantity,
            caller.to_audit_actor(),
            &timestamp(now)?,
        )
        .map_err(translate_persistence_error)?;

    publish_best_effort(
        sink,
        Notification::PartsIssued {
            dealer_id: job.dealer_id,
            job_card_id,
            usage_id: usage.usage_id,
            variant_id: usage.variant_id,
            quantity: usage.quantity,
        },
    );

    Ok(usage)
}

/// Returns parts from a usage record to stock.
///
/// # Errors
///
/// Returns `ApiError::InvalidRequest` for a zero quantity or an
/// over-return, `ApiError::NotFound`, or `ApiError::Forbidden`.
pub fn return_parts(
    persistence: &mut Persistence,
    sink: &dyn NotificationSink,
    caller: &CallerContext,
    usage_id: i64,
    request: &ReturnPartsRequest,
    now: OffsetDateTime,
) -> Result<ReturnPartsResponse, ApiError> {
    require_positive_quantity(request.quantity)?;

    let usage: PartsUsage = persistence
        .get_parts_usage(usage_id)
        .map_err(translate_persistence_error)?;
    let job: JobCard = load_authorized_job(persistence, caller, usage.job_card_id, "return_parts")?;

    let plan = persistence
        .return_parts(
            usage_id,
            request.quantity,
            request.reason.as_deref(),
            caller.to_audit_actor(),
            &timestamp(now)?,
        )
        .map_err(translate_persistence_error)?;

    let response = ReturnPartsResponse {
        usage_id,
        returned_quantity: plan.returned_quantity,
        remaining_quantity: plan.remaining_quantity(),
        fully_returned: plan.fully_returned(),
    };

    publish_best_effort(
        sink,
        Notification::PartsReturned {
            dealer_id: job.dealer_id,
            job_card_id: job.job_card_id,
            usage_id,
            returned_quantity: response.returned_quantity,
            fully_returned: response.fully_returned,
        },
    );

    Ok(response)
}

/// Lists the parts a job currently holds.
///
/// # Errors
///
/// Returns `ApiError::NotFound` or `ApiError::Forbidden`.
pub fn list_job_parts(
    persistence: &mut Persistence,
    caller: &CallerContext,
    job_card_id: i64,
) -> Result<JobPartsResponse, ApiError> {
    load_authorized_job(persistence, caller, job_card_id, "list_job_parts")?;

    let parts: Vec<PartsUsage> = persistence
        .list_parts_usage_for_job(job_card_id)
        .map_err(translate_persistence_error)?;

    Ok(JobPartsResponse { job_card_id, parts })
}

/// Lists a product's batches in cost-basis order.
///
/// # Errors
///
/// Returns `ApiError::InvalidRequest` for an unknown strategy or
/// `ApiError::Forbidden` for another dealer's stock.
pub fn list_batches(
    persistence: &mut Persistence,
    caller: &CallerContext,
    request: &ListBatchesRequest,
) -> Result<ListBatchesResponse, ApiError> {
    let strategy: CostBasisStrategy =
        CostBasisStrategy::from_str(&request.strategy).map_err(translate_domain_error)?;
    AuthorizationService::authorize_dealer(caller, request.dealer_id, "list_batches")?;

    let batches = persistence
        .list_cost_basis_batches(request.dealer_id, request.product_id, strategy)
        .map_err(translate_persistence_error)?;

    Ok(ListBatchesResponse { strategy, batches })
}

/// Parses a rule's condition, falling back to the default threshold.
fn rule_condition(rule: &EscalationRule) -> EscalationCondition {
    EscalationCondition::from_json(&rule.condition_json).unwrap_or_else(|e| {
        warn!(
            rule_id = rule.rule_id,
            error = %e,
            "Malformed escalation condition, using default threshold"
        );
        EscalationCondition::default()
    })
}

/// Raises escalations for every job that has breached an active
/// `time_breach` rule and has never been escalated under it.
///
/// Each escalation is inserted on its own, so a scan interrupted part way
/// keeps what it already raised and the next scan picks up the rest.
///
/// # Errors
///
/// Returns `ApiError::Internal` if a query or insert fails.
pub fn run_escalation_scan(
    persistence: &mut Persistence,
    sink: &dyn NotificationSink,
    now: OffsetDateTime,
) -> Result<EscalationScanResponse, ApiError> {
    let rules: Vec<EscalationRule> = persistence
        .list_active_rules(&EscalationTrigger::TimeBreach)
        .map_err(translate_persistence_error)?;

    let mut escalations: Vec<Escalation> = Vec::new();

    for rule in &rules {
        let condition: EscalationCondition = rule_condition(rule);
        let threshold: String = escalation_threshold(&condition, now).map_err(translate_core_error)?;

        let already_escalated: Vec<i64> = persistence
            .escalated_entity_ids(rule.rule_id, ENTITY_TYPE_JOB_CARD)
            .map_err(translate_persistence_error)?;
        let breaching: Vec<JobCard> = persistence
            .find_breaching_jobs(rule.dealer_id, &threshold, &already_escalated)
            .map_err(translate_persistence_error)?;

        for job in &breaching {
            let planned = plan_escalation(rule, job, &condition, now).map_err(translate_core_error)?;
            let Some(escalation) = persistence
                .record_escalation(&planned)
                .map_err(translate_persistence_error)?
            else {
                continue;
            };

            publish_best_effort(
                sink,
                Notification::EscalationRaised {
                    dealer_id: escalation.dealer_id,
                    escalation_id: escalation.escalation_id,
                    rule_id: escalation.rule_id,
                    entity_type: escalation.entity_type.clone(),
                    entity_id: escalation.entity_id,
                    reason: escalation.reason.clone(),
                },
            );
            escalations.push(escalation);
        }
    }

    info!(
        rules = rules.len(),
        raised = escalations.len(),
        "Escalation scan complete"
    );

    Ok(EscalationScanResponse {
        count: escalations.len(),
        escalations,
    })
}

fn move_escalation(
    persistence: &mut Persistence,
    caller: &CallerContext,
    escalation_id: i64,
    to: EscalationStatus,
    action: &str,
    now: OffsetDateTime,
) -> Result<Escalation, ApiError> {
    AuthorizationService::authorize_escalation_handling(caller, action)?;

    let escalation: Escalation = persistence
        .get_escalation(escalation_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_dealer(caller, escalation.dealer_id, action)?;

    let updated: Escalation = persistence
        .update_escalation_status(escalation_id, to, &timestamp(now)?)
        .map_err(translate_persistence_error)?;

    info!(
        escalation_id,
        status = updated.status.as_str(),
        actor = %caller.user_id,
        "Escalation updated"
    );

    Ok(updated)
}

/// Acknowledges an active escalation.
///
/// # Errors
///
/// Returns `ApiError::Forbidden`, `ApiError::NotFound`, or
/// `ApiError::InvalidRequest` if the escalation is not active.
pub fn acknowledge_escalation(
    persistence: &mut Persistence,
    caller: &CallerContext,
    escalation_id: i64,
    now: OffsetDateTime,
) -> Result<Escalation, ApiError> {
    move_escalation(
        persistence,
        caller,
        escalation_id,
        EscalationStatus::Acknowledged,
        "acknowledge_escalation",
        now,
    )
}

/// Resolves an escalation.
///
/// The (rule, job) pair stays suppressed after resolution.
///
/// # Errors
///
/// Returns `ApiError::Forbidden`, `ApiError::NotFound`, or
/// `ApiError::InvalidRequest` if the escalation is already resolved.
pub fn resolve_escalation(
    persistence: &mut Persistence,
    caller: &CallerContext,
    escalation_id: i64,
    now: OffsetDateTime,
) -> Result<Escalation, ApiError> {
    move_escalation(
        persistence,
        caller,
        escalation_id,
        EscalationStatus::Resolved,
        "resolve_escalation",
        now,
    )
}

/// Appends a caller-authored event to a job's log.
///
/// # Errors
///
/// Returns `ApiError::InvalidRequest` for an unknown or reserved event
/// type, `ApiError::NotFound`, or `ApiError::Forbidden`.
pub fn record_job_event(
    persistence: &mut Persistence,
    caller: &CallerContext,
    job_card_id: i64,
    request: &RecordJobEventRequest,
    now: OffsetDateTime,
) -> Result<RecordJobEventResponse, ApiError> {
    let kind: JobEventKind =
        JobEventKind::from_str(&request.event_type).map_err(translate_domain_error)?;
    if request.description.trim().is_empty() {
        return Err(ApiError::InvalidRequest {
            field: String::from("description"),
            message: String::from("Description cannot be empty"),
        });
    }
    load_authorized_job(persistence, caller, job_card_id, "record_job_event")?;

    let event: JobEvent = JobEvent::user_event(
        job_card_id,
        kind,
        request.description.clone(),
        caller.to_audit_actor(),
        request.metadata.clone(),
        timestamp(now)?,
    )
    .map_err(translate_domain_error)?;

    let event_id: i64 = persistence
        .record_job_event(&event)
        .map_err(translate_persistence_error)?;

    Ok(RecordJobEventResponse {
        event_id,
        job_card_id,
        event_type: kind,
    })
}

/// Returns a job's status history and event log.
///
/// # Errors
///
/// Returns `ApiError::NotFound` or `ApiError::Forbidden`.
pub fn get_job_history(
    persistence: &mut Persistence,
    caller: &CallerContext,
    job_card_id: i64,
) -> Result<JobHistoryResponse, ApiError> {
    load_authorized_job(persistence, caller, job_card_id, "get_job_history")?;

    let status_history = persistence
        .get_status_history(job_card_id)
        .map_err(translate_persistence_error)?;
    let events = persistence
        .get_job_events(job_card_id)
        .map_err(translate_persistence_error)?;

    Ok(JobHistoryResponse {
        job_card_id,
        status_history,
        events,
    })
}
