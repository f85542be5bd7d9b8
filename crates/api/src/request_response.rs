// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workbay_audit::JobEventKind;
use workbay_domain::{CostBasisStrategy, Escalation, InventoryBatch, JobStatus, PartsUsage};
use workbay_persistence::{JobEventRecord, StatusHistoryRecord};

/// API request to move a job card to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// The target status name.
    pub to_status: String,
    /// Optional free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Optional structured metadata stored with the history entry.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// API response for a successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub job_card_id: i64,
    pub previous_status: JobStatus,
    pub status: JobStatus,
}

/// API request to issue parts from stock to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePartsRequest {
    /// The variant to draw from.
    pub variant_id: i64,
    /// Units to issue.
    pub quantity: u32,
}

/// API request to return parts from a usage record to stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPartsRequest {
    /// Units to return.
    pub quantity: u32,
    /// Optional free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// API response for a successful return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPartsResponse {
    pub usage_id: i64,
    pub returned_quantity: u32,
    pub remaining_quantity: u32,
    /// True when the usage record was removed.
    pub fully_returned: bool,
}

/// The usage records held by a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPartsResponse {
    pub job_card_id: i64,
    pub parts: Vec<PartsUsage>,
}

/// API request to list cost-basis batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBatchesRequest {
    pub dealer_id: i64,
    pub product_id: i64,
    /// `FIFO` or `LIFO`.
    pub strategy: String,
}

/// Batches in cost-basis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBatchesResponse {
    pub strategy: CostBasisStrategy,
    pub batches: Vec<InventoryBatch>,
}

/// Outcome of one escalation scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationScanResponse {
    /// Number of escalations raised by this scan.
    pub count: usize,
    pub escalations: Vec<Escalation>,
}

/// API request to record a caller-authored job event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordJobEventRequest {
    /// `photo_added`, `checklist_update` or `note_added`.
    pub event_type: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// API response for a recorded job event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordJobEventResponse {
    pub event_id: i64,
    pub job_card_id: i64,
    pub event_type: JobEventKind,
}

/// A job's status history and event log, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHistoryResponse {
    pub job_card_id: i64,
    pub status_history: Vec<StatusHistoryRecord>,
    pub events: Vec<JobEventRecord>,
}

/// A job's current status and its legal successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedTransitionsResponse {
    pub job_card_id: i64,
    pub status: JobStatus,
    pub allowed: Vec<JobStatus>,
}
