// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Workbay workshop core.
//!
//! This crate owns the relational store: job cards and their audit trail,
//! the parts ledger, inventory batches and escalations. It is built on
//! Diesel over `SQLite`.
//!
//! ## Units of Work
//!
//! Mutations that must be atomic (`transition_job`, `issue_parts`,
//! `return_parts`, `record_escalation`, `update_escalation_status`) run
//! inside a single immediate transaction and re-read the rows they depend
//! on after the write lock is held. Business rules are evaluated by the
//! `workbay` core crate against those fresh rows; a rejection surfaces as
//! `PersistenceError::Rejected` and rolls the unit back.
//!
//! ## Concurrency
//!
//! File databases run in WAL mode with a busy timeout, so independent
//! adapters on the same file serialise their writers instead of failing.
//! Stock decrements are additionally guarded by a conditional update and a
//! `CHECK (stock_quantity >= 0)` constraint.
//!
//! ## Testing
//!
//! - `new_in_memory()` gives each caller an isolated shared-cache database
//! - Migrations are embedded and applied on every connection

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

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use workbay::{NewEscalation, ReturnPlan, TransitionCommand, TransitionResult};
use workbay_audit::{Actor, JobEvent};
use workbay_domain::{
    CostBasisStrategy, Escalation, EscalationRule, EscalationStatus, EscalationTrigger,
    InventoryBatch, JobCard, PartVariant, PartsUsage, TransitionTable,
};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::MIGRATIONS;
pub use data_models::{
    JobEventRecord, NewEscalationRule, NewInventoryBatch, NewJobCard, NewPartVariant,
    StatusHistoryRecord,
};
pub use error::PersistenceError;

/// Persistence adapter for the workshop core.
///
/// Owns a single `SQLite` connection. Callers that share an adapter across
/// tasks wrap it in a mutex.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // WAL lets readers proceed while a writer holds the lock
        backend::sqlite::enable_wal_mode(&mut conn)?;

        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Job Cards
    // ========================================================================

    /// Registers a job card in the `created` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_job_card(&mut self, job: &NewJobCard) -> Result<JobCard, PersistenceError> {
        mutations::jobs::create_job_card(&mut self.conn, job)
    }

    /// Retrieves a job card by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the job card does not exist.
    pub fn get_job_card(&mut self, job_card_id: i64) -> Result<JobCard, PersistenceError> {
        queries::jobs::get_job_card(&mut self.conn, job_card_id)
    }

    /// Transitions a job card as one unit of work.
    ///
    /// # Arguments
    ///
    /// * `table` - The transition table to validate against
    /// * `job_card_id` - The job to transition
    /// * `command` - The requested status, actor, reason and metadata
    /// * `now` - Storage timestamp of the transition
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::Rejected`
    /// for an illegal transition, or a database error.
    pub fn transition_job(
        &mut self,
        table: &TransitionTable,
        job_card_id: i64,
        command: TransitionCommand,
        now: &str,
    ) -> Result<TransitionResult, PersistenceError> {
        mutations::jobs::transition_job(&mut self.conn, table, job_card_id, command, now)
    }

    /// Appends a caller-recorded job event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the job does not exist.
    pub fn record_job_event(&mut self, event: &JobEvent) -> Result<i64, PersistenceError> {
        mutations::jobs::record_job_event(&mut self.conn, event)
    }

    /// Lists a job's status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_status_history(
        &mut self,
        job_card_id: i64,
    ) -> Result<Vec<StatusHistoryRecord>, PersistenceError> {
        queries::jobs::get_status_history(&mut self.conn, job_card_id)
    }

    /// Lists a job's events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_job_events(
        &mut self,
        job_card_id: i64,
    ) -> Result<Vec<JobEventRecord>, PersistenceError> {
        queries::jobs::get_job_events(&mut self.conn, job_card_id)
    }

    // ========================================================================
    // Parts Ledger
    // ========================================================================

    /// Registers a part variant with opening stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_part_variant(
        &mut self,
        variant: &NewPartVariant,
    ) -> Result<PartVariant, PersistenceError> {
        mutations::inventory::create_part_variant(&mut self.conn, variant)
    }

    /// Retrieves a part variant by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the variant does not exist.
    pub fn get_part_variant(&mut self, variant_id: i64) -> Result<PartVariant, PersistenceError> {
        queries::inventory::get_part_variant(&mut self.conn, variant_id)
    }

    /// Retrieves a parts usage record by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the record does not exist.
    pub fn get_parts_usage(&mut self, usage_id: i64) -> Result<PartsUsage, PersistenceError> {
        queries::inventory::get_parts_usage(&mut self.conn, usage_id)
    }

    /// Lists the usage records held by a job.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_parts_usage_for_job(
        &mut self,
        job_card_id: i64,
    ) -> Result<Vec<PartsUsage>, PersistenceError> {
        queries::inventory::list_parts_usage_for_job(&mut self.conn, job_card_id)
    }

    /// Issues parts to a job as one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::Rejected`
    /// for insufficient stock, or a database error.
    pub fn issue_parts(
        &mut self,
        job_card_id: i64,
        variant_id: i64,
        quantity: u32,
        actor: Actor,
        now: &str,
    ) -> Result<PartsUsage, PersistenceError> {
        mutations::inventory::issue_parts(
            &mut self.conn,
            job_card_id,
            variant_id,
            quantity,
            actor,
            now,
        )
    }

    /// Returns parts to stock as one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::Rejected`
    /// for an over-return, or a database error.
    pub fn return_parts(
        &mut self,
        usage_id: i64,
        quantity: u32,
        reason: Option<&str>,
        actor: Actor,
        now: &str,
    ) -> Result<ReturnPlan, PersistenceError> {
        mutations::inventory::return_parts(&mut self.conn, usage_id, quantity, reason, actor, now)
    }

    // ========================================================================
    // Inventory Batches
    // ========================================================================

    /// Records a received inventory batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_batch(
        &mut self,
        batch: &NewInventoryBatch,
    ) -> Result<InventoryBatch, PersistenceError> {
        mutations::inventory::create_batch(&mut self.conn, batch)
    }

    /// Lists active, non-empty batches in cost-basis order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_cost_basis_batches(
        &mut self,
        dealer_id: i64,
        product_id: i64,
        strategy: CostBasisStrategy,
    ) -> Result<Vec<InventoryBatch>, PersistenceError> {
        queries::inventory::list_cost_basis_batches(&mut self.conn, dealer_id, product_id, strategy)
    }

    // ========================================================================
    // Escalations
    // ========================================================================

    /// Stores an escalation rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_escalation_rule(
        &mut self,
        rule: &NewEscalationRule,
    ) -> Result<EscalationRule, PersistenceError> {
        mutations::escalations::create_escalation_rule(&mut self.conn, rule)
    }

    /// Lists active rules with the given trigger.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_rules(
        &mut self,
        trigger: &EscalationTrigger,
    ) -> Result<Vec<EscalationRule>, PersistenceError> {
        queries::escalations::list_active_rules(&mut self.conn, trigger)
    }

    /// Lists every entity already escalated under a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn escalated_entity_ids(
        &mut self,
        rule_id: i64,
        entity_type: &str,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::escalations::escalated_entity_ids(&mut self.conn, rule_id, entity_type)
    }

    /// Finds a dealer's in-progress jobs created before `threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_breaching_jobs(
        &mut self,
        dealer_id: i64,
        threshold: &str,
        exclude: &[i64],
    ) -> Result<Vec<JobCard>, PersistenceError> {
        queries::jobs::find_breaching_jobs(&mut self.conn, dealer_id, threshold, exclude)
    }

    /// Inserts an escalation unless its key is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_escalation(
        &mut self,
        escalation: &NewEscalation,
    ) -> Result<Option<Escalation>, PersistenceError> {
        mutations::escalations::record_escalation(&mut self.conn, escalation)
    }

    /// Retrieves an escalation by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the escalation does not exist.
    pub fn get_escalation(&mut self, escalation_id: i64) -> Result<Escalation, PersistenceError> {
        queries::escalations::get_escalation(&mut self.conn, escalation_id)
    }

    /// Lists the escalations raised against an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_escalations_for_entity(
        &mut self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<Escalation>, PersistenceError> {
        queries::escalations::list_escalations_for_entity(&mut self.conn, entity_type, entity_id)
    }

    /// Moves an escalation to a new status.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound`, `PersistenceError::Rejected`
    /// for a disallowed status change, or a database error.
    pub fn update_escalation_status(
        &mut self,
        escalation_id: i64,
        to: EscalationStatus,
        now: &str,
    ) -> Result<Escalation, PersistenceError> {
        mutations::escalations::update_escalation_status(&mut self.conn, escalation_id, to, now)
    }
}
