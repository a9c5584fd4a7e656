// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::config::Tolerances;
use crate::geometry::LeafMetrics;
use crate::utils::math::{approx_eq, round_to};
use serde::{Deserialize, Serialize};

/// Quantized structural summary of a leaf.
///
/// Equality is tolerance-based (see [`Fingerprint::matches`]); this is
/// never used as an identity or hash key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub rounded_volume: f64,
    /// Placed extents, largest first
    pub sorted_bbox_dims: [f64; 3],
    pub face_count: usize,
    pub edge_count: usize,
}

impl Fingerprint {
    pub fn of(metrics: &LeafMetrics, tolerances: &Tolerances) -> Self {
        let dims = metrics.extents;
        Self {
            rounded_volume: round_to(metrics.volume, tolerances.volume_decimals),
            sorted_bbox_dims: dims.map(|d| round_to(d, tolerances.dimension_decimals)),
            face_count: metrics.face_count,
            edge_count: metrics.edge_count,
        }
    }

    pub fn matches(&self, other: &Fingerprint, tolerances: &Tolerances) -> bool {
        if self.face_count != other.face_count || self.edge_count != other.edge_count {
            return false;
        }
        if !approx_eq(self.rounded_volume, other.rounded_volume, tolerances.volume_match()) {
            return false;
        }
        let slack = tolerances.dimension_match();
        self.sorted_bbox_dims
            .iter()
            .zip(other.sorted_bbox_dims.iter())
            .all(|(a, b)| approx_eq(*a, *b, slack))
    }
}
