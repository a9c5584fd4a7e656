// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory scene graph

use super::{SceneNode, SceneSource, SubgraphRef};
use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scene held in memory: a root node plus a table of named sub-scenes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub root: Option<SceneNode>,
    #[serde(default)]
    pub subgraphs: BTreeMap<SubgraphRef, SceneNode>,
}

impl SceneGraph {
    pub fn new(root: SceneNode) -> Self {
        Self {
            root: Some(root),
            subgraphs: BTreeMap::new(),
        }
    }

    /// Builder-style subgraph registration
    pub fn with_subgraph(mut self, name: impl Into<SubgraphRef>, node: SceneNode) -> Self {
        self.insert_subgraph(name, node);
        self
    }

    /// Register a sub-scene, returning the one it replaced
    pub fn insert_subgraph(
        &mut self,
        name: impl Into<SubgraphRef>,
        node: SceneNode,
    ) -> Option<SceneNode> {
        self.subgraphs.insert(name.into(), node)
    }

    pub fn subgraph_count(&self) -> usize {
        self.subgraphs.len()
    }
}

impl SceneSource for SceneGraph {
    fn root(&self) -> Result<&SceneNode, ExtractError> {
        self.root
            .as_ref()
            .ok_or_else(|| ExtractError::SourceUnreadable("scene has no root node".to_string()))
    }

    fn resolve_subgraph(&self, reference: &SubgraphRef) -> Option<&SceneNode> {
        self.subgraphs.get(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Transform;

    #[test]
    fn test_missing_root_is_unreadable() {
        let graph = SceneGraph::default();
        assert!(matches!(graph.root(), Err(ExtractError::SourceUnreadable(_))));
    }

    #[test]
    fn test_resolve_registered_subgraph() {
        let graph = SceneGraph::new(SceneNode::instance("part", Transform::identity()))
            .with_subgraph("part", SceneNode::assembly(vec![]));
        assert!(graph.resolve_subgraph(&SubgraphRef::new("part")).is_some());
        assert!(graph.resolve_subgraph(&SubgraphRef::new("other")).is_none());
        assert_eq!(graph.subgraph_count(), 1);
    }
}
