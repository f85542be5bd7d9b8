// Copyright (C) 2026 The Workbay Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutations and atomic units of work.
//!
//! Every unit of work runs inside one `BEGIN IMMEDIATE` transaction: the
//! write lock is taken before the first read, so concurrent writers on the
//! same database are serialised and each sees the committed result of the
//! previous one. Any error rolls the whole unit back.

pub mod escalations;
pub mod inventory;
pub mod jobs;
