// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance-based grouping of geometrically identical leaves

mod fingerprint;
mod grouping;

pub use fingerprint::Fingerprint;
pub use grouping::{Group, GroupId, GroupSet};
