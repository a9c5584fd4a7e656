// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flattening of the instance tree into placed leaves

mod classify;
mod flattener;
mod leaf;

pub use classify::classify;
pub use flattener::{Flatten, Flattener};
pub use leaf::{FlattenedLeaf, LeafId, Validity};
