// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run-wide counters.
//!
//! One [`ExtractionStats`] is threaded explicitly through a run. Parallel
//! workers each fill their own shard, which are merged in source order.

use crate::fallback::TierTally;
use crate::flatten::Validity;
use serde::{Deserialize, Serialize};

/// Diagnostics for one traversal depth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthCounters {
    pub depth: u32,
    pub instances: usize,
    pub leaves: usize,
}

/// Counters accumulated over one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub instances_visited: usize,
    pub leaves_found: usize,
    pub max_depth: u32,
    pub rejected_transforms: usize,
    pub unresolved_references: usize,
    pub cyclic_references: usize,
    pub valid: usize,
    pub surface_only: usize,
    pub degenerate: usize,
    /// Fallback outcomes for `Degenerate` leaves
    pub fallback: TierTally,
    pub cancelled: bool,
    per_depth: Vec<DepthCounters>,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn depth_slot(&mut self, depth: u32) -> &mut DepthCounters {
        let index = depth as usize;
        while self.per_depth.len() <= index {
            let next = self.per_depth.len() as u32;
            self.per_depth.push(DepthCounters {
                depth: next,
                ..DepthCounters::default()
            });
        }
        self.max_depth = self.max_depth.max(depth);
        &mut self.per_depth[index]
    }

    pub fn record_instance(&mut self, depth: u32) {
        self.instances_visited += 1;
        self.depth_slot(depth).instances += 1;
    }

    pub fn record_leaf(&mut self, depth: u32, validity: Validity) {
        self.leaves_found += 1;
        self.depth_slot(depth).leaves += 1;
        match validity {
            Validity::Valid => self.valid += 1,
            Validity::SurfaceOnly => self.surface_only += 1,
            Validity::Degenerate => self.degenerate += 1,
        }
    }

    pub fn record_rejected_transform(&mut self) {
        self.rejected_transforms += 1;
    }

    pub fn per_depth(&self) -> &[DepthCounters] {
        &self.per_depth
    }

    /// Fold a worker shard into this accumulator
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.instances_visited += other.instances_visited;
        self.leaves_found += other.leaves_found;
        self.rejected_transforms += other.rejected_transforms;
        self.unresolved_references += other.unresolved_references;
        self.cyclic_references += other.cyclic_references;
        self.valid += other.valid;
        self.surface_only += other.surface_only;
        self.degenerate += other.degenerate;
        self.fallback.merge(&other.fallback);
        self.cancelled |= other.cancelled;

        for counters in &other.per_depth {
            if counters.instances == 0 && counters.leaves == 0 {
                continue;
            }
            let slot = self.depth_slot(counters.depth);
            slot.instances += counters.instances;
            slot.leaves += counters.leaves;
        }
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_depth_counters() {
        let mut stats = ExtractionStats::new();
        stats.record_instance(0);
        stats.record_leaf(2, Validity::Valid);
        stats.record_leaf(2, Validity::Degenerate);

        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.per_depth().len(), 3);
        assert_eq!(stats.per_depth()[1].leaves, 0);
        assert_eq!(stats.per_depth()[2].leaves, 2);
        assert_eq!(stats.valid + stats.surface_only + stats.degenerate, stats.leaves_found);
    }

    #[test]
    fn test_merge_matches_sequential_accumulation() {
        let mut sequential = ExtractionStats::new();
        sequential.record_instance(0);
        sequential.record_leaf(1, Validity::Valid);
        sequential.record_instance(0);
        sequential.record_leaf(1, Validity::SurfaceOnly);
        sequential.record_rejected_transform();

        let mut a = ExtractionStats::new();
        a.record_instance(0);
        a.record_leaf(1, Validity::Valid);
        let mut b = ExtractionStats::new();
        b.record_instance(0);
        b.record_leaf(1, Validity::SurfaceOnly);
        b.record_rejected_transform();

        let mut merged = ExtractionStats::new();
        merged.merge(&a);
        merged.merge(&b);
        assert_eq!(merged, sequential);
    }
}
