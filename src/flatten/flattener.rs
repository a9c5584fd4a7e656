// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Iterative instance-tree flattener
//!
//! Traversal uses an explicit work stack instead of call recursion, so the
//! nesting depth of a scene is bounded by memory rather than by the thread
//! stack. Children are visited depth-first in source order.

use super::{classify, FlattenedLeaf, LeafId};
use crate::cancel::CancellationToken;
use crate::config::Tolerances;
use crate::geometry::{LeafMetrics, Transform, TransformComposer};
use crate::scene::{SceneNode, SceneSource, SubgraphRef};
use crate::stats::ExtractionStats;
use ahash::AHashMap;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Walks a scene source and emits placed leaves
pub struct Flattener<'s, S: ?Sized> {
    source: &'s S,
    composer: TransformComposer,
    volume_epsilon: f64,
    cancel: Option<CancellationToken>,
}

impl<'s, S: SceneSource + ?Sized> Flattener<'s, S> {
    pub fn new(source: &'s S, tolerances: &Tolerances) -> Self {
        Self {
            source,
            composer: TransformComposer::new(tolerances.transform_epsilon),
            volume_epsilon: tolerances.volume_epsilon,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Stream the leaves below `root`, placed by `accumulated`.
    ///
    /// A singular `accumulated` transform yields nothing and counts as one
    /// rejected transform.
    pub fn flatten<'a>(
        &'a self,
        root: &'s SceneNode,
        accumulated: Transform,
        depth: u32,
        stats: &'a mut ExtractionStats,
    ) -> Flatten<'a, 's, S> {
        match self.composer.validate(accumulated) {
            Ok(transform) => Flatten::new(self, root, transform, depth, stats),
            Err(rejected) => {
                debug!(determinant = rejected.determinant, "Rejected root transform");
                stats.record_rejected_transform();
                Flatten::exhausted(self, stats)
            }
        }
    }

    /// Flatten the children of a root assembly on worker threads.
    ///
    /// Each worker keeps its own stats shard; shards and leaves are merged
    /// in source order and ids re-assigned, so the result equals a
    /// sequential [`Flattener::flatten`] from depth 0.
    pub fn flatten_parallel(
        &self,
        root: &'s SceneNode,
        accumulated: Transform,
        stats: &mut ExtractionStats,
    ) -> Vec<FlattenedLeaf<'s>>
    where
        S: Sync,
    {
        let children = match root {
            SceneNode::Assembly(children) if children.len() > 1 => children,
            _ => return self.flatten(root, accumulated, 0, stats).collect(),
        };

        let transform = match self.composer.validate(accumulated) {
            Ok(transform) => transform,
            Err(rejected) => {
                debug!(determinant = rejected.determinant, "Rejected root transform");
                stats.record_rejected_transform();
                return Vec::new();
            }
        };

        let shards: Vec<(Vec<FlattenedLeaf<'s>>, ExtractionStats)> = children
            .par_iter()
            .map(|child| {
                let mut shard = ExtractionStats::new();
                let leaves = Flatten::new(self, child, transform, 0, &mut shard).collect();
                (leaves, shard)
            })
            .collect();

        let mut leaves = Vec::with_capacity(shards.iter().map(|(l, _)| l.len()).sum());
        for (shard_leaves, shard_stats) in shards {
            stats.merge(&shard_stats);
            for mut leaf in shard_leaves {
                leaf.id = LeafId(leaves.len());
                leaves.push(leaf);
            }
        }
        leaves
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

enum Frame<'s> {
    Visit {
        node: &'s SceneNode,
        transform: Transform,
        depth: u32,
        subgraph: Option<&'s SubgraphRef>,
    },
    /// Leaves the scope of an instanced subgraph
    Exit(&'s SubgraphRef),
}

/// Iterator over the placed leaves of one traversal
pub struct Flatten<'a, 's, S: ?Sized> {
    flattener: &'a Flattener<'s, S>,
    stack: Vec<Frame<'s>>,
    /// Subgraphs open on the current path, for cycle detection
    active: AHashMap<&'s SubgraphRef, usize>,
    stats: &'a mut ExtractionStats,
    next_id: usize,
}

impl<'a, 's, S: SceneSource + ?Sized> Flatten<'a, 's, S> {
    fn new(
        flattener: &'a Flattener<'s, S>,
        root: &'s SceneNode,
        transform: Transform,
        depth: u32,
        stats: &'a mut ExtractionStats,
    ) -> Self {
        let mut walk = Self::exhausted(flattener, stats);
        walk.stack.push(Frame::Visit {
            node: root,
            transform,
            depth,
            subgraph: None,
        });
        walk
    }

    fn exhausted(flattener: &'a Flattener<'s, S>, stats: &'a mut ExtractionStats) -> Self {
        Self {
            flattener,
            stack: Vec::new(),
            active: AHashMap::new(),
            stats,
            next_id: 0,
        }
    }

    fn enter_instance(
        &mut self,
        reference: &'s SubgraphRef,
        local: &Transform,
        parent: &Transform,
        depth: u32,
    ) {
        self.stats.record_instance(depth);

        let composed = match self.flattener.composer.compose(parent, local) {
            Ok(composed) => composed,
            Err(rejected) => {
                debug!(
                    subgraph = %reference,
                    depth,
                    determinant = rejected.determinant,
                    "Rejected instance transform, skipping subtree"
                );
                self.stats.record_rejected_transform();
                return;
            }
        };

        let Some(target) = self.flattener.source.resolve_subgraph(reference) else {
            warn!(subgraph = %reference, depth, "Unresolved subgraph reference");
            self.stats.unresolved_references += 1;
            return;
        };

        if self.active.get(reference).copied().unwrap_or(0) > 0 {
            warn!(subgraph = %reference, depth, "Cyclic subgraph reference, skipping");
            self.stats.cyclic_references += 1;
            return;
        }

        *self.active.entry(reference).or_insert(0) += 1;
        self.stack.push(Frame::Exit(reference));
        self.stack.push(Frame::Visit {
            node: target,
            transform: composed,
            depth: depth + 1,
            subgraph: Some(reference),
        });
    }
}

impl<'a, 's, S: SceneSource + ?Sized> Iterator for Flatten<'a, 's, S> {
    type Item = FlattenedLeaf<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            if self.flattener.is_cancelled() {
                self.stats.cancelled = true;
                self.stack.clear();
                return None;
            }

            match frame {
                Frame::Exit(reference) => {
                    if let Some(count) = self.active.get_mut(reference) {
                        *count = count.saturating_sub(1);
                    }
                }
                Frame::Visit {
                    node,
                    transform,
                    depth,
                    subgraph,
                } => match node {
                    SceneNode::Leaf(payload) => {
                        let metrics = LeafMetrics::measure(payload, &transform);
                        let validity = classify(&metrics, self.flattener.volume_epsilon);
                        self.stats.record_leaf(depth, validity);

                        let id = LeafId(self.next_id);
                        self.next_id += 1;
                        return Some(FlattenedLeaf {
                            id,
                            geometry: payload,
                            world_transform: transform,
                            depth,
                            validity,
                            metrics,
                            subgraph,
                        });
                    }
                    SceneNode::Assembly(children) => {
                        for child in children.iter().rev() {
                            self.stack.push(Frame::Visit {
                                node: child,
                                transform,
                                depth,
                                subgraph,
                            });
                        }
                    }
                    SceneNode::Instance {
                        subgraph: reference,
                        local,
                    } => {
                        self.enter_instance(reference, local, &transform, depth);
                    }
                },
            }
        }
        None
    }
}
