// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parts ledger mutations: issue, return, and stock intake.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{info, warn};
use workbay::{
    CoreError, IssuePlan, ReturnOutcome, ReturnPlan, plan_issue, plan_return, restocked_quantity,
};
use workbay_audit::{Actor, JobEvent};
use workbay_domain::{
    DomainError, InventoryBatch, JobCard, PartVariant, PartsUsage, normalize_date,
};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewInventoryBatch, NewPartVariant, to_stored_quantity};
use crate::diesel_schema::{inventory_batches, part_variants, parts_usage};
use crate::error::PersistenceError;
use crate::mutations::jobs::insert_job_event;
use crate::queries::inventory::{get_part_variant, get_parts_usage};
use crate::queries::jobs::get_job_card;

/// Registers a part variant with its opening stock.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_part_variant(
    conn: &mut SqliteConnection,
    variant: &NewPartVariant,
) -> Result<PartVariant, PersistenceError> {
    diesel::insert_into(part_variants::table)
        .values((
            part_variants::dealer_id.eq(variant.dealer_id),
            part_variants::part_id.eq(variant.part_id),
            part_variants::sku.eq(&variant.sku),
            part_variants::stock_quantity.eq(to_stored_quantity(variant.stock_quantity)?),
            part_variants::price_cents.eq(variant.price_cents),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_part_variant: {e}")))?;

    let variant_id: i64 = get_last_insert_rowid(conn)?;
    info!(variant_id, sku = %variant.sku, "Created part variant");

    get_part_variant(conn, variant_id)
}

/// Records a received inventory batch.
///
/// The batch's current quantity starts equal to the received quantity.
///
/// # Errors
///
/// Returns `PersistenceError::Rejected` if `received_date` is not a
/// `YYYY-MM-DD` date, or an error if the insert fails.
pub fn create_batch(
    conn: &mut SqliteConnection,
    batch: &NewInventoryBatch,
) -> Result<InventoryBatch, PersistenceError> {
    let quantity: i32 = to_stored_quantity(batch.quantity)?;
    // Cost-basis ordering sorts this column as text.
    let received_date: String = normalize_date(&batch.received_date).map_err(CoreError::from)?;

    diesel::insert_into(inventory_batches::table)
        .values((
            inventory_batches::dealer_id.eq(batch.dealer_id),
            inventory_batches::product_id.eq(batch.product_id),
            inventory_batches::batch_number.eq(&batch.batch_number),
            inventory_batches::received_date.eq(&received_date),
            inventory_batches::initial_quantity.eq(quantity),
            inventory_batches::current_quantity.eq(quantity),
            inventory_batches::unit_cost_cents.eq(batch.unit_cost_cents),
            inventory_batches::status.eq(batch.status.as_str()),
        ))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("create_batch: {e}")))?;

    let batch_id: i64 = get_last_insert_rowid(conn)?;

    Ok(InventoryBatch {
        batch_id,
        dealer_id: batch.dealer_id,
        product_id: batch.product_id,
        batch_number: batch.batch_number.clone(),
        received_date,
        initial_quantity: batch.quantity,
        current_quantity: batch.quantity,
        unit_cost_cents: batch.unit_cost_cents,
        status: batch.status,
    })
}

/// Issues parts from a variant's stock to a job as one unit of work.
///
/// Stock is decremented with a conditional update that only matches while
/// enough stock remains, so the counter can never go negative even if two
/// writers race past the planning step.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `job_card_id` - The receiving job
/// * `variant_id` - The variant to draw from
/// * `quantity` - Units to issue
/// * `actor` - The actor issuing the parts
/// * `now` - Storage timestamp of the issue
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for a missing job or variant,
/// `PersistenceError::Rejected` for insufficient stock or an invalid
/// quantity, or a database error. Nothing is written on error.
pub fn issue_parts(
    conn: &mut SqliteConnection,
    job_card_id: i64,
    variant_id: i64,
    quantity: u32,
    actor: Actor,
    now: &str,
) -> Result<PartsUsage, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let job: JobCard = get_job_card(conn, job_card_id)?;
        let variant: PartVariant = get_part_variant(conn, variant_id)?;
        let plan: IssuePlan = plan_issue(&job, &variant, quantity, actor, now)?;
        let stored_quantity: i32 = to_stored_quantity(plan.quantity)?;

        let decremented: usize = diesel::update(
            part_variants::table
                .filter(part_variants::variant_id.eq(variant_id))
                .filter(part_variants::stock_quantity.ge(stored_quantity)),
        )
        .set(part_variants::stock_quantity.eq(part_variants::stock_quantity - stored_quantity))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("issue_parts: {e}")))?;

        if decremented == 0 {
            let current: PartVariant = get_part_variant(conn, variant_id)?;
            warn!(
                variant_id,
                requested = quantity,
                available = current.stock_quantity,
                "Conditional stock decrement matched no rows"
            );
            return Err(PersistenceError::Rejected(CoreError::DomainViolation(
                DomainError::InsufficientStock {
                    variant_id,
                    requested: quantity,
                    available: current.stock_quantity,
                },
            )));
        }

        diesel::insert_into(parts_usage::table)
            .values((
                parts_usage::job_card_id.eq(plan.job_card_id),
                parts_usage::variant_id.eq(plan.variant_id),
                parts_usage::quantity.eq(stored_quantity),
                parts_usage::unit_price_cents.eq(plan.unit_price_cents),
                parts_usage::total_price_cents.eq(plan.total_price_cents),
                parts_usage::issued_by.eq(&plan.actor.id),
                parts_usage::issued_at.eq(&plan.issued_at),
            ))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("issue_parts: {e}")))?;

        let usage: PartsUsage = plan.to_usage(get_last_insert_rowid(conn)?);
        let event: JobEvent = plan.event(&usage);
        insert_job_event(conn, &event)?;

        info!(
            usage_id = usage.usage_id,
            job_card_id,
            variant_id,
            quantity,
            remaining_stock = plan.remaining_stock,
            "Issued parts"
        );

        Ok(usage)
    })
}

/// Returns parts from a usage record to stock as one unit of work.
///
/// A full return deletes the usage record. A partial return reduces its
/// quantity and re-totals it at the original unit price.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `usage_id` - The usage record
/// * `quantity` - Units to return
/// * `reason` - Optional free-text reason
/// * `actor` - The actor returning the parts
/// * `now` - Storage timestamp of the return
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for a missing usage record,
/// `PersistenceError::Rejected` for an over-return or invalid quantity, or
/// a database error. Nothing is written on error.
pub fn return_parts(
    conn: &mut SqliteConnection,
    usage_id: i64,
    quantity: u32,
    reason: Option<&str>,
    actor: Actor,
    now: &str,
) -> Result<ReturnPlan, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let usage: PartsUsage = get_parts_usage(conn, usage_id)?;
        let plan: ReturnPlan = plan_return(&usage, quantity, reason, actor, now)?;
        let variant: PartVariant = get_part_variant(conn, usage.variant_id)?;
        let restocked: u32 = restocked_quantity(&variant, quantity)?;
        let stored_quantity: i32 = to_stored_quantity(quantity)?;

        diesel::update(part_variants::table.filter(part_variants::variant_id.eq(usage.variant_id)))
            .set(part_variants::stock_quantity.eq(part_variants::stock_quantity + stored_quantity))
            .execute(conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("return_parts: {e}")))?;

        match plan.outcome {
            ReturnOutcome::Full => {
                diesel::delete(parts_usage::table.filter(parts_usage::usage_id.eq(usage_id)))
                    .execute(conn)
                    .map_err(|e| PersistenceError::QueryFailed(format!("return_parts: {e}")))?;
            }
            ReturnOutcome::Partial {
                new_quantity,
                new_total_price_cents,
            } => {
                diesel::update(parts_usage::table.filter(parts_usage::usage_id.eq(usage_id)))
                    .set((
                        parts_usage::quantity.eq(to_stored_quantity(new_quantity)?),
                        parts_usage::total_price_cents.eq(new_total_price_cents),
                    ))
                    .execute(conn)
                    .map_err(|e| PersistenceError::QueryFailed(format!("return_parts: {e}")))?;
            }
        }

        insert_job_event(conn, &plan.event)?;

        info!(
            usage_id,
            variant_id = usage.variant_id,
            returned = quantity,
            remaining = plan.remaining_quantity(),
            stock = restocked,
            fully_returned = plan.fully_returned(),
            "Returned parts"
        );

        Ok(plan)
    })
}
