// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Escalation rule and history queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use workbay_domain::{Escalation, EscalationRule, EscalationTrigger};

use crate::data_models::{EscalationRow, EscalationRuleRow};
use crate::diesel_schema::{escalation_history, escalation_rules};
use crate::error::PersistenceError;

/// Lists active rules with the given trigger, across all dealers.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_active_rules(
    conn: &mut SqliteConnection,
    trigger: &EscalationTrigger,
) -> Result<Vec<EscalationRule>, PersistenceError> {
    let rows: Vec<EscalationRuleRow> = escalation_rules::table
        .filter(escalation_rules::trigger_type.eq(trigger.as_str()))
        .filter(escalation_rules::is_active.eq(1))
        .order(escalation_rules::rule_id.asc())
        .select(EscalationRuleRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_active_rules: {e}")))?;

    Ok(rows.into_iter().map(EscalationRule::from).collect())
}

/// Lists every entity already escalated under a rule, whatever its status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn escalated_entity_ids(
    conn: &mut SqliteConnection,
    rule_id: i64,
    entity_type: &str,
) -> Result<Vec<i64>, PersistenceError> {
    escalation_history::table
        .filter(escalation_history::rule_id.eq(rule_id))
        .filter(escalation_history::entity_type.eq(entity_type))
        .select(escalation_history::entity_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("escalated_entity_ids: {e}")))
}

/// Retrieves an escalation by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the escalation does not exist.
pub fn get_escalation(
    conn: &mut SqliteConnection,
    escalation_id: i64,
) -> Result<Escalation, PersistenceError> {
    let row: Option<EscalationRow> = escalation_history::table
        .filter(escalation_history::escalation_id.eq(escalation_id))
        .select(EscalationRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_escalation: {e}")))?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("escalation {escalation_id}")))?
        .try_into()
}

/// Lists every escalation raised against an entity, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_escalations_for_entity(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: i64,
) -> Result<Vec<Escalation>, PersistenceError> {
    let rows: Vec<EscalationRow> = escalation_history::table
        .filter(escalation_history::entity_type.eq(entity_type))
        .filter(escalation_history::entity_id.eq(entity_id))
        .order(escalation_history::escalation_id.asc())
        .select(EscalationRow::as_select())
        .load(conn)
        .map_err(|e| {
            PersistenceError::QueryFailed(format!("list_escalations_for_entity: {e}"))
        })?;

    rows.into_iter().map(Escalation::try_from).collect()
}
