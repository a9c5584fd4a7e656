// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene node definitions

use crate::geometry::{GeometryPayload, Transform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a reusable sub-scene in the source's subgraph table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubgraphRef(pub String);

impl SubgraphRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubgraphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubgraphRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One node of the instance tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneNode {
    /// Terminal geometry
    Leaf(GeometryPayload),

    /// Placement of a reusable sub-scene
    Instance {
        subgraph: SubgraphRef,
        #[serde(default)]
        local: Transform,
    },

    /// Ordered, unplaced collection of nodes
    Assembly(Vec<SceneNode>),
}

impl SceneNode {
    pub fn leaf(payload: impl Into<GeometryPayload>) -> Self {
        SceneNode::Leaf(payload.into())
    }

    pub fn instance(subgraph: impl Into<SubgraphRef>, local: Transform) -> Self {
        SceneNode::Instance {
            subgraph: subgraph.into(),
            local,
        }
    }

    pub fn assembly(children: Vec<SceneNode>) -> Self {
        SceneNode::Assembly(children)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SceneNode::Leaf(_) => "leaf",
            SceneNode::Instance { .. } => "instance",
            SceneNode::Assembly(_) => "assembly",
        }
    }
}
