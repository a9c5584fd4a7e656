// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene source interface

use super::{SceneNode, SubgraphRef};
use crate::error::ExtractError;

/// Read-only access to an imported scene.
///
/// The extraction engine borrows nodes for the duration of a run and never
/// mutates the source.
pub trait SceneSource {
    /// Root of the instance tree. An error here is the only failure that
    /// stops a run.
    fn root(&self) -> Result<&SceneNode, ExtractError>;

    /// Look up the sub-scene an `Instance` refers to
    fn resolve_subgraph(&self, reference: &SubgraphRef) -> Option<&SceneNode>;
}
