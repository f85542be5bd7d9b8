// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod apply;
mod command;
mod error;
mod escalation;
mod inventory;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply_transition;
pub use command::TransitionCommand;
pub use error::CoreError;
pub use escalation::{INITIAL_ESCALATION_LEVEL, escalation_threshold, plan_escalation};
pub use inventory::{plan_issue, plan_return, restocked_quantity};
pub use state::{IssuePlan, NewEscalation, ReturnOutcome, ReturnPlan, TransitionResult};
