// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::Value;
use workbay_audit::Actor;
use workbay_domain::JobStatus;

/// A request to move a job card to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    /// The requested status.
    pub to: JobStatus,
    /// The actor performing the transition.
    pub actor: Actor,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// Optional caller-supplied metadata.
    pub metadata: Option<Value>,
}

impl TransitionCommand {
    /// Creates a command without reason or metadata.
    #[must_use]
    pub const fn new(to: JobStatus, actor: Actor) -> Self {
        Self {
            to,
            actor,
            reason: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
