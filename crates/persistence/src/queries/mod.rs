// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! All queries use Diesel DSL and take the connection explicitly so they
//! can run either standalone or inside a unit of work.

pub mod escalations;
pub mod inventory;
pub mod jobs;
