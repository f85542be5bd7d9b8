// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Parts issue and return planning against a variant's aggregate stock.

use crate::error::CoreError;
use crate::state::{IssuePlan, ReturnOutcome, ReturnPlan};
use workbay_audit::{Actor, JobEvent};
use workbay_domain::{DomainError, JobCard, PartVariant, PartsUsage};

fn line_total(quantity: u32, unit_price_cents: i64) -> Result<i64, DomainError> {
    unit_price_cents
        .checked_mul(i64::from(quantity))
        .ok_or(DomainError::PriceOverflow {
            quantity,
            unit_price_cents,
        })
}

const fn require_positive(quantity: u32) -> Result<(), DomainError> {
    if quantity == 0 {
        return Err(DomainError::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Plans issuing `quantity` units of a variant to a job.
///
/// The unit price is snapshotted from the variant as it is now.
///
/// # Arguments
///
/// * `job` - The receiving job card
/// * `variant` - The variant as read inside the unit of work
/// * `quantity` - Units to issue
/// * `actor` - The actor issuing the parts
/// * `now` - Storage timestamp of the issue
///
/// # Errors
///
/// Returns an error if:
/// - `quantity` is zero
/// - The variant belongs to a different dealer than the job
/// - The variant has fewer than `quantity` units in stock
/// - The line total overflows
pub fn plan_issue(
    job: &JobCard,
    variant: &PartVariant,
    quantity: u32,
    actor: Actor,
    now: &str,
) -> Result<IssuePlan, CoreError> {
    require_positive(quantity)?;

    if job.dealer_id != variant.dealer_id {
        return Err(DomainError::DealerMismatch {
            job_dealer_id: job.dealer_id,
            variant_dealer_id: variant.dealer_id,
        }
        .into());
    }

    let Some(remaining_stock) = variant.stock_quantity.checked_sub(quantity) else {
        return Err(DomainError::InsufficientStock {
            variant_id: variant.variant_id,
            requested: quantity,
            available: variant.stock_quantity,
        }
        .into());
    };

    let total_price_cents: i64 = line_total(quantity, variant.price_cents)?;

    Ok(IssuePlan {
        job_card_id: job.job_card_id,
        variant_id: variant.variant_id,
        sku: variant.sku.clone(),
        quantity,
        unit_price_cents: variant.price_cents,
        total_price_cents,
        remaining_stock,
        actor,
        issued_at: now.to_string(),
    })
}

/// Plans returning `quantity` units from a usage record to stock.
///
/// A full return deletes the usage record. A partial return keeps it with
/// the reduced quantity, re-totalled at the original unit price snapshot.
///
/// # Arguments
///
/// * `usage` - The usage record as read inside the unit of work
/// * `quantity` - Units to return
/// * `reason` - Optional free-text reason
/// * `actor` - The actor returning the parts
/// * `now` - Storage timestamp of the return
///
/// # Errors
///
/// Returns an error if `quantity` is zero, exceeds the usage quantity, or
/// the new line total overflows.
pub fn plan_return(
    usage: &PartsUsage,
    quantity: u32,
    reason: Option<&str>,
    actor: Actor,
    now: &str,
) -> Result<ReturnPlan, CoreError> {
    require_positive(quantity)?;

    let Some(new_quantity) = usage.quantity.checked_sub(quantity) else {
        return Err(DomainError::OverReturn {
            usage_id: usage.usage_id,
            requested: quantity,
            remaining: usage.quantity,
        }
        .into());
    };

    let outcome: ReturnOutcome = if new_quantity == 0 {
        ReturnOutcome::Full
    } else {
        ReturnOutcome::Partial {
            new_quantity,
            new_total_price_cents: line_total(new_quantity, usage.unit_price_cents)?,
        }
    };

    let event: JobEvent = JobEvent::parts_returned(usage, quantity, reason, actor, now.to_string());

    Ok(ReturnPlan {
        usage_id: usage.usage_id,
        job_card_id: usage.job_card_id,
        variant_id: usage.variant_id,
        returned_quantity: quantity,
        outcome,
        event,
    })
}

/// Stock level of a variant after `quantity` units are put back.
///
/// # Errors
///
/// Returns `DomainError::StockOverflow` if the counter would overflow.
pub fn restocked_quantity(variant: &PartVariant, quantity: u32) -> Result<u32, CoreError> {
    variant
        .stock_quantity
        .checked_add(quantity)
        .filter(|stock| i32::try_from(*stock).is_ok())
        .ok_or_else(|| {
            DomainError::StockOverflow {
                variant_id: variant.variant_id,
            }
            .into()
        })
}
