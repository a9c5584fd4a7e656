// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flattened leaf records

use crate::geometry::{GeometryPayload, LeafMetrics, Transform};
use crate::scene::SubgraphRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a leaf in traversal order, unique within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafId(pub usize);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric validity of a placed leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validity {
    /// Faces enclosing a real volume
    Valid,
    /// Faces but no enclosed volume: sheets and membranes, still real output
    SurfaceOnly,
    /// No faces; must go through the fallback cascade
    Degenerate,
}

impl Validity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Valid => "valid",
            Validity::SurfaceOnly => "surface-only",
            Validity::Degenerate => "degenerate",
        }
    }
}

/// One placed leaf. Borrows its payload from the scene source and is never
/// mutated after the flattener creates it.
#[derive(Debug, Clone)]
pub struct FlattenedLeaf<'s> {
    pub id: LeafId,
    pub geometry: &'s GeometryPayload,
    pub world_transform: Transform,
    pub depth: u32,
    pub validity: Validity,
    pub metrics: LeafMetrics,
    /// Sub-scene this leaf was instanced from, if any
    pub subgraph: Option<&'s SubgraphRef>,
}
