// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Part variant, usage and batch queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use workbay_domain::{BatchStatus, CostBasisStrategy, InventoryBatch, PartVariant, PartsUsage};

use crate::data_models::{InventoryBatchRow, PartVariantRow, PartsUsageRow};
use crate::diesel_schema::{inventory_batches, part_variants, parts_usage};
use crate::error::PersistenceError;

/// Retrieves a part variant by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the variant does not exist.
pub fn get_part_variant(
    conn: &mut SqliteConnection,
    variant_id: i64,
) -> Result<PartVariant, PersistenceError> {
    let row: Option<PartVariantRow> = part_variants::table
        .filter(part_variants::variant_id.eq(variant_id))
        .select(PartVariantRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_part_variant: {e}")))?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("part variant {variant_id}")))?
        .try_into()
}

/// Retrieves a parts usage record by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the record does not exist.
pub fn get_parts_usage(
    conn: &mut SqliteConnection,
    usage_id: i64,
) -> Result<PartsUsage, PersistenceError> {
    let row: Option<PartsUsageRow> = parts_usage::table
        .filter(parts_usage::usage_id.eq(usage_id))
        .select(PartsUsageRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_parts_usage: {e}")))?;

    row.ok_or_else(|| PersistenceError::NotFound(format!("parts usage {usage_id}")))?
        .try_into()
}

/// Lists the usage records held by a job, in issue order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_parts_usage_for_job(
    conn: &mut SqliteConnection,
    job_card_id: i64,
) -> Result<Vec<PartsUsage>, PersistenceError> {
    let rows: Vec<PartsUsageRow> = parts_usage::table
        .filter(parts_usage::job_card_id.eq(job_card_id))
        .order(parts_usage::usage_id.asc())
        .select(PartsUsageRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_parts_usage_for_job: {e}")))?;

    rows.into_iter().map(PartsUsage::try_from).collect()
}

/// Lists the batches eligible for cost-basis consumption.
///
/// Only active batches with remaining quantity are returned, ordered by
/// receipt date (oldest first for FIFO, newest first for LIFO) with
/// `batch_id` breaking ties in the same direction.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `dealer_id` - The dealer scope
/// * `product_id` - The product whose batches are listed
/// * `strategy` - FIFO or LIFO
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_cost_basis_batches(
    conn: &mut SqliteConnection,
    dealer_id: i64,
    product_id: i64,
    strategy: CostBasisStrategy,
) -> Result<Vec<InventoryBatch>, PersistenceError> {
    let query = inventory_batches::table
        .filter(inventory_batches::dealer_id.eq(dealer_id))
        .filter(inventory_batches::product_id.eq(product_id))
        .filter(inventory_batches::status.eq(BatchStatus::Active.as_str()))
        .filter(inventory_batches::current_quantity.gt(0))
        .select(InventoryBatchRow::as_select())
        .into_boxed();

    let query = if strategy.oldest_first() {
        query.order((
            inventory_batches::received_date.asc(),
            inventory_batches::batch_id.asc(),
        ))
    } else {
        query.order((
            inventory_batches::received_date.desc(),
            inventory_batches::batch_id.desc(),
        ))
    };

    let rows: Vec<InventoryBatchRow> = query
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_cost_basis_batches: {e}")))?;

    rows.into_iter().map(InventoryBatch::try_from).collect()
}
