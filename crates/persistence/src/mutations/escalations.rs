// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Escalation rule intake and escalation history mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};
use workbay::{CoreError, NewEscalation};
use workbay_domain::{Escalation, EscalationRule, EscalationStatus};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewEscalationRule;
use crate::diesel_schema::{escalation_history, escalation_rules};
use crate::error::PersistenceError;
use crate::queries::escalations::get_escalation;

/// Stores an escalation rule.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_escalation_rule(
    conn: &mut SqliteConnection,
    rule: &NewEscalationRule,
) -> Result<EscalationRule, PersistenceError> {
    diesel::insert_into(escalation_rules::table)
        .values((
            escalation_rules::dealer_id.eq(rule.dealer_id),
            escalation_rules::name.eq(&rule.name),
            escalation_rules::trigger_type.eq(rule.trigger.as_str()),
            escalation_rules::condition_json.eq(&rule.condition_json),
            escalation_rules::action.eq(&rule.action),
            escalation_rules::is_active.eq(i32::from(rule.is_active)),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_escalation_rule: {e}")))?;

    let rule_id: i64 = get_last_insert_rowid(conn)?;
    info!(rule_id, dealer_id = rule.dealer_id, "Created escalation rule");

    Ok(EscalationRule {
        rule_id,
        dealer_id: rule.dealer_id,
        name: rule.name.clone(),
        trigger: rule.trigger.clone(),
        condition_json: rule.condition_json.clone(),
        action: rule.action.clone(),
        is_active: rule.is_active,
    })
}

/// Inserts an escalation unless one already exists for its
/// `(rule, entity_type, entity_id)` key.
///
/// Returns `None` when the key was already taken.
///
/// # Errors
///
/// Returns an error if the insert fails for any other reason.
pub fn record_escalation(
    conn: &mut SqliteConnection,
    escalation: &NewEscalation,
) -> Result<Option<Escalation>, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let inserted: usize = diesel::insert_or_ignore_into(escalation_history::table)
            .values((
                escalation_history::dealer_id.eq(escalation.dealer_id),
                escalation_history::rule_id.eq(escalation.rule_id),
                escalation_history::entity_type.eq(escalation.entity_type),
                escalation_history::entity_id.eq(escalation.entity_id),
                escalation_history::level.eq(i32::from(escalation.level)),
                escalation_history::reason.eq(&escalation.reason),
                escalation_history::status.eq(escalation.status.as_str()),
                escalation_history::created_at.eq(&escalation.created_at),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("record_escalation: {e}")))?;

        if inserted == 0 {
            debug!(
                rule_id = escalation.rule_id,
                entity_id = escalation.entity_id,
                "Escalation already recorded"
            );
            return Ok(None);
        }

        let escalation_id: i64 = get_last_insert_rowid(conn)?;
        info!(
            escalation_id,
            rule_id = escalation.rule_id,
            entity_id = escalation.entity_id,
            "Recorded escalation"
        );

        get_escalation(conn, escalation_id).map(Some)
    })
}

/// Moves an escalation to a new status.
///
/// Entering `resolved` stamps `resolved_at`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the escalation does not exist,
/// `PersistenceError::Rejected` if the status change is not permitted, or a
/// database error.
pub fn update_escalation_status(
    conn: &mut SqliteConnection,
    escalation_id: i64,
    to: EscalationStatus,
    now: &str,
) -> Result<Escalation, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let current: Escalation = get_escalation(conn, escalation_id)?;
        current
            .status
            .validate_transition(to)
            .map_err(CoreError::from)?;

        let resolved_at: Option<&str> = if to == EscalationStatus::Resolved {
            Some(now)
        } else {
            current.resolved_at.as_deref()
        };

        diesel::update(
            escalation_history::table.filter(escalation_history::escalation_id.eq(escalation_id)),
        )
        .set((
            escalation_history::status.eq(to.as_str()),
            escalation_history::resolved_at.eq(resolved_at),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("update_escalation_status: {e}")))?;

        info!(
            escalation_id,
            from = current.status.as_str(),
            to = to.as_str(),
            "Updated escalation status"
        );

        get_escalation(conn, escalation_id)
    })
}
