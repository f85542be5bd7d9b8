// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions into domain values.
//!
//! Quantities are `u32` in the domain and `INTEGER` (`i32`) in storage.
//! Every narrowing or widening goes through `num_traits::ToPrimitive` so
//! that an out-of-range stored value surfaces as a reconstruction error
//! instead of wrapping.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use workbay_audit::JobEventKind;
use workbay_domain::{
    BatchStatus, Escalation, EscalationRule, EscalationStatus, EscalationTrigger, InventoryBatch,
    JobCard, JobStatus, PartVariant, PartsUsage,
};

use crate::diesel_schema::{
    escalation_history, escalation_rules, inventory_batches, job_cards, job_events,
    job_status_history, part_variants, parts_usage,
};
use crate::error::PersistenceError;

pub(crate) fn to_stored_quantity(quantity: u32) -> Result<i32, PersistenceError> {
    quantity.to_i32().ok_or_else(|| {
        PersistenceError::SerializationError(format!("quantity {quantity} exceeds storage range"))
    })
}

pub(crate) fn from_stored_quantity(column: &str, value: i32) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("{column} holds negative value {value}"))
    })
}

fn parse_column<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column}: {e}")))
}

fn parse_metadata(value: Option<String>) -> Result<Option<Value>, PersistenceError> {
    value
        .map(|json| serde_json::from_str::<Value>(&json))
        .transpose()
        .map_err(PersistenceError::from)
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = job_cards)]
pub(crate) struct JobCardRow {
    job_card_id: i64,
    dealer_id: i64,
    job_number: String,
    status: String,
    technician_id: Option<i64>,
    created_at: String,
    service_started_at: Option<String>,
    service_ended_at: Option<String>,
    updated_at: String,
}

impl TryFrom<JobCardRow> for JobCard {
    type Error = PersistenceError;

    fn try_from(row: JobCardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            job_card_id: row.job_card_id,
            dealer_id: row.dealer_id,
            job_number: row.job_number,
            status: parse_column::<JobStatus>("job_cards.status", &row.status)?,
            technician_id: row.technician_id,
            created_at: row.created_at,
            service_started_at: row.service_started_at,
            service_ended_at: row.service_ended_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = part_variants)]
pub(crate) struct PartVariantRow {
    variant_id: i64,
    dealer_id: i64,
    part_id: i64,
    sku: String,
    stock_quantity: i32,
    price_cents: i64,
}

impl TryFrom<PartVariantRow> for PartVariant {
    type Error = PersistenceError;

    fn try_from(row: PartVariantRow) -> Result<Self, Self::Error> {
        Ok(Self {
            variant_id: row.variant_id,
            dealer_id: row.dealer_id,
            part_id: row.part_id,
            sku: row.sku,
            stock_quantity: from_stored_quantity(
                "part_variants.stock_quantity",
                row.stock_quantity,
            )?,
            price_cents: row.price_cents,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = parts_usage)]
pub(crate) struct PartsUsageRow {
    usage_id: i64,
    job_card_id: i64,
    variant_id: i64,
    quantity: i32,
    unit_price_cents: i64,
    total_price_cents: i64,
    issued_by: String,
    issued_at: String,
}

impl TryFrom<PartsUsageRow> for PartsUsage {
    type Error = PersistenceError;

    fn try_from(row: PartsUsageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            usage_id: row.usage_id,
            job_card_id: row.job_card_id,
            variant_id: row.variant_id,
            quantity: from_stored_quantity("parts_usage.quantity", row.quantity)?,
            unit_price_cents: row.unit_price_cents,
            total_price_cents: row.total_price_cents,
            issued_by: row.issued_by,
            issued_at: row.issued_at,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = inventory_batches)]
pub(crate) struct InventoryBatchRow {
    batch_id: i64,
    dealer_id: i64,
    product_id: i64,
    batch_number: String,
    received_date: String,
    initial_quantity: i32,
    current_quantity: i32,
    unit_cost_cents: i64,
    status: String,
}

impl TryFrom<InventoryBatchRow> for InventoryBatch {
    type Error = PersistenceError;

    fn try_from(row: InventoryBatchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            batch_id: row.batch_id,
            dealer_id: row.dealer_id,
            product_id: row.product_id,
            batch_number: row.batch_number,
            received_date: row.received_date,
            initial_quantity: from_stored_quantity(
                "inventory_batches.initial_quantity",
                row.initial_quantity,
            )?,
            current_quantity: from_stored_quantity(
                "inventory_batches.current_quantity",
                row.current_quantity,
            )?,
            unit_cost_cents: row.unit_cost_cents,
            status: parse_column::<BatchStatus>("inventory_batches.status", &row.status)?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = escalation_rules)]
pub(crate) struct EscalationRuleRow {
    rule_id: i64,
    dealer_id: i64,
    name: String,
    trigger_type: String,
    condition_json: String,
    action: String,
    is_active: i32,
}

impl From<EscalationRuleRow> for EscalationRule {
    fn from(row: EscalationRuleRow) -> Self {
        Self {
            rule_id: row.rule_id,
            dealer_id: row.dealer_id,
            name: row.name,
            trigger: EscalationTrigger::from(row.trigger_type.as_str()),
            condition_json: row.condition_json,
            action: row.action,
            is_active: row.is_active != 0,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = escalation_history)]
pub(crate) struct EscalationRow {
    escalation_id: i64,
    dealer_id: i64,
    rule_id: i64,
    entity_type: String,
    entity_id: i64,
    level: i32,
    reason: String,
    status: String,
    created_at: String,
    resolved_at: Option<String>,
}

impl TryFrom<EscalationRow> for Escalation {
    type Error = PersistenceError;

    fn try_from(row: EscalationRow) -> Result<Self, Self::Error> {
        let level: u8 = row.level.to_u8().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "escalation_history.level out of range: {}",
                row.level
            ))
        })?;

        Ok(Self {
            escalation_id: row.escalation_id,
            dealer_id: row.dealer_id,
            rule_id: row.rule_id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            level,
            reason: row.reason,
            status: parse_column::<EscalationStatus>("escalation_history.status", &row.status)?,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

/// A stored job status history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryRecord {
    pub history_id: i64,
    pub job_card_id: i64,
    pub from_status: JobStatus,
    pub to_status: JobStatus,
    pub actor_id: String,
    pub reason: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = job_status_history)]
pub(crate) struct StatusHistoryRow {
    history_id: i64,
    job_card_id: i64,
    from_status: String,
    to_status: String,
    actor_id: String,
    reason: Option<String>,
    metadata_json: Option<String>,
    created_at: String,
}

impl TryFrom<StatusHistoryRow> for StatusHistoryRecord {
    type Error = PersistenceError;

    fn try_from(row: StatusHistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            history_id: row.history_id,
            job_card_id: row.job_card_id,
            from_status: parse_column("job_status_history.from_status", &row.from_status)?,
            to_status: parse_column("job_status_history.to_status", &row.to_status)?,
            actor_id: row.actor_id,
            reason: row.reason,
            metadata: parse_metadata(row.metadata_json)?,
            created_at: row.created_at,
        })
    }
}

/// A stored job event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEventRecord {
    pub event_id: i64,
    pub job_card_id: i64,
    pub event_type: JobEventKind,
    pub description: String,
    pub actor_id: String,
    pub metadata: Option<Value>,
    pub created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = job_events)]
pub(crate) struct JobEventRow {
    event_id: i64,
    job_card_id: i64,
    event_type: String,
    description: String,
    actor_id: String,
    metadata_json: Option<String>,
    created_at: String,
}

impl TryFrom<JobEventRow> for JobEventRecord {
    type Error = PersistenceError;

    fn try_from(row: JobEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: row.event_id,
            job_card_id: row.job_card_id,
            event_type: parse_column("job_events.event_type", &row.event_type)?,
            description: row.description,
            actor_id: row.actor_id,
            metadata: parse_metadata(row.metadata_json)?,
            created_at: row.created_at,
        })
    }
}

/// Input for registering a job card at intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobCard {
    pub dealer_id: i64,
    pub job_number: String,
    pub technician_id: Option<i64>,
    pub created_at: String,
}

/// Input for registering a part variant and its opening stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPartVariant {
    pub dealer_id: i64,
    pub part_id: i64,
    pub sku: String,
    pub stock_quantity: u32,
    pub price_cents: i64,
}

/// Input for recording a received inventory batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryBatch {
    pub dealer_id: i64,
    pub product_id: i64,
    pub batch_number: String,
    pub received_date: String,
    pub quantity: u32,
    pub unit_cost_cents: i64,
    pub status: BatchStatus,
}

/// Input for authoring an escalation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEscalationRule {
    pub dealer_id: i64,
    pub name: String,
    pub trigger: EscalationTrigger,
    pub condition_json: String,
    pub action: String,
    pub is_active: bool,
}
