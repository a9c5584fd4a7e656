// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Extraction report returned at the end of a run

use crate::dedup::{Fingerprint, Group, GroupId};
use crate::fallback::{FallbackTier, TierTally};
use crate::flatten::LeafId;
use crate::output::{BatchMode, BatchResult};
use crate::stats::{DepthCounters, ExtractionStats};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

// Custom serialization for Duration
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

/// Successful recoveries per fallback tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub edges: usize,
    pub tessellation: usize,
    pub marker: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.edges + self.tessellation + self.marker
    }
}

impl From<&TierTally> for TierCounts {
    fn from(tally: &TierTally) -> Self {
        Self {
            edges: tally.successes(FallbackTier::Edges),
            tessellation: tally.successes(FallbackTier::Tessellation),
            marker: tally.successes(FallbackTier::Marker),
        }
    }
}

/// One equivalence group as reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub representative: Fingerprint,
    pub members: Vec<LeafId>,
}

impl From<Group> for GroupSummary {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            representative: group.representative,
            members: group.members,
        }
    }
}

/// What the output batcher did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub mode: BatchMode,
    pub objects_created: usize,
    pub sink_calls: usize,
    pub rejected_calls: usize,
    pub bisections: usize,
    /// Recoveries forced by sink rejection, not by leaf validity
    pub recovered: TierCounts,
    pub dropped: Vec<LeafId>,
}

impl BatchSummary {
    pub fn new(mode: BatchMode, result: &BatchResult) -> Self {
        Self {
            mode,
            objects_created: result.handles.len(),
            sink_calls: result.sink_calls,
            rejected_calls: result.rejected_calls,
            bisections: result.bisections,
            recovered: TierCounts::from(&result.recovered),
            dropped: result.dropped.clone(),
        }
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new(BatchMode::default(), &BatchResult::default())
    }
}

/// Summary of one extraction run. A pure value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub total_leaves: usize,
    pub valid: usize,
    pub surface_only: usize,
    pub degenerate: usize,
    pub fallback_tier_counts: TierCounts,
    pub groups_found: usize,
    pub rejected_transforms: usize,
    pub max_depth: u32,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub elapsed: Duration,
    pub instances_visited: usize,
    pub unresolved_references: usize,
    pub cyclic_references: usize,
    pub per_depth: Vec<DepthCounters>,
    pub groups: Vec<GroupSummary>,
    pub batching: BatchSummary,
    pub cancelled: bool,
}

impl ExtractionReport {
    pub fn new(
        stats: &ExtractionStats,
        groups: Vec<Group>,
        batching: BatchSummary,
        elapsed: Duration,
    ) -> Self {
        Self {
            total_leaves: stats.leaves_found,
            valid: stats.valid,
            surface_only: stats.surface_only,
            degenerate: stats.degenerate,
            fallback_tier_counts: TierCounts::from(&stats.fallback),
            groups_found: groups.len(),
            rejected_transforms: stats.rejected_transforms,
            max_depth: stats.max_depth,
            elapsed,
            instances_visited: stats.instances_visited,
            unresolved_references: stats.unresolved_references,
            cyclic_references: stats.cyclic_references,
            per_depth: stats.per_depth().to_vec(),
            groups: groups.into_iter().map(GroupSummary::from).collect(),
            batching,
            cancelled: stats.cancelled,
        }
    }

    /// Compare every count and group assignment, ignoring `elapsed`
    pub fn counts_eq(&self, other: &ExtractionReport) -> bool {
        let mut timed = self.clone();
        timed.elapsed = other.elapsed;
        timed == *other
    }

    /// Classification and fallback totals add up
    pub fn is_consistent(&self) -> bool {
        self.valid + self.surface_only + self.degenerate == self.total_leaves
            && self.fallback_tier_counts.total() == self.degenerate
            && self.groups.iter().map(|g| g.members.len()).sum::<usize>() == self.total_leaves
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
