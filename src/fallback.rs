// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fallback cascade for leaves that cannot be emitted as-is.
//!
//! Tiers are tried in order of decreasing fidelity and the first success
//! wins. Every attempt and success is tallied so consumers can audit how
//! recovered geometry was produced.

use crate::error::{InvalidGeometry, TierFailure};
use crate::flatten::LeafId;
use crate::geometry::{GeometryPayload, Mesh, Triangle, Vertex};
use crate::output::OutputShape;
use crate::utils::math::triangle_area;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Area below which a synthesized triangle counts as collapsed
const MIN_PATCH_AREA: f64 = 1e-12;

/// Recovery strategies, highest fidelity first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FallbackTier {
    /// Wireframe from the remaining edge curves
    Edges,
    /// Triangulated patch over recovered vertices
    Tessellation,
    /// Zero-extent placeholder at the placement origin
    Marker,
}

impl FallbackTier {
    pub const ALL: [FallbackTier; 3] = [
        FallbackTier::Edges,
        FallbackTier::Tessellation,
        FallbackTier::Marker,
    ];

    pub fn index(self) -> usize {
        match self {
            FallbackTier::Edges => 0,
            FallbackTier::Tessellation => 1,
            FallbackTier::Marker => 2,
        }
    }

    /// The next lower-fidelity tier, if any
    pub fn next(self) -> Option<FallbackTier> {
        match self {
            FallbackTier::Edges => Some(FallbackTier::Tessellation),
            FallbackTier::Tessellation => Some(FallbackTier::Marker),
            FallbackTier::Marker => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackTier::Edges => "edges",
            FallbackTier::Tessellation => "tessellation",
            FallbackTier::Marker => "marker",
        }
    }
}

/// Attempts and successes per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTally {
    pub attempts: [usize; 3],
    pub successes: [usize; 3],
}

impl TierTally {
    pub fn record_attempt(&mut self, tier: FallbackTier) {
        self.attempts[tier.index()] += 1;
    }

    pub fn record_success(&mut self, tier: FallbackTier) {
        self.successes[tier.index()] += 1;
    }

    pub fn successes(&self, tier: FallbackTier) -> usize {
        self.successes[tier.index()]
    }

    pub fn attempts(&self, tier: FallbackTier) -> usize {
        self.attempts[tier.index()]
    }

    pub fn total_successes(&self) -> usize {
        self.successes.iter().sum()
    }

    pub fn merge(&mut self, other: &TierTally) {
        for i in 0..3 {
            self.attempts[i] += other.attempts[i];
            self.successes[i] += other.successes[i];
        }
    }
}

/// Degraded representation produced by one tier
#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    pub tier: FallbackTier,
    pub shape: OutputShape,
}

/// The tier state machine
#[derive(Debug, Clone, Copy)]
pub struct FallbackCascade {
    weld_epsilon: f64,
}

impl FallbackCascade {
    pub fn new(weld_epsilon: f64) -> Self {
        Self { weld_epsilon }
    }

    /// Run the full cascade. The marker tier cannot fail, so neither can this.
    pub fn recover(&self, leaf: LeafId, payload: &GeometryPayload, tally: &mut TierTally) -> Recovery {
        for tier in [FallbackTier::Edges, FallbackTier::Tessellation] {
            if let Some(recovery) = self.try_tier(leaf, payload, tier, tally) {
                return recovery;
            }
        }
        self.marker(leaf, tally)
    }

    /// Run the cascade starting at `start`; `None` means every tier has
    /// already been used up for this leaf.
    pub fn recover_from(
        &self,
        leaf: LeafId,
        payload: &GeometryPayload,
        start: Option<FallbackTier>,
        tally: &mut TierTally,
    ) -> Result<Recovery, InvalidGeometry> {
        let mut tier = start.ok_or(InvalidGeometry { leaf })?;
        loop {
            if tier == FallbackTier::Marker {
                return Ok(self.marker(leaf, tally));
            }
            if let Some(recovery) = self.try_tier(leaf, payload, tier, tally) {
                return Ok(recovery);
            }
            tier = tier.next().ok_or(InvalidGeometry { leaf })?;
        }
    }

    fn try_tier(
        &self,
        leaf: LeafId,
        payload: &GeometryPayload,
        tier: FallbackTier,
        tally: &mut TierTally,
    ) -> Option<Recovery> {
        tally.record_attempt(tier);
        let attempt = match tier {
            FallbackTier::Edges => self.extract_edges(payload),
            FallbackTier::Tessellation => self.tessellate(payload),
            FallbackTier::Marker => Ok(OutputShape::Marker),
        };
        match attempt {
            Ok(shape) => {
                tally.record_success(tier);
                debug!(leaf = %leaf, tier = tier.as_str(), "Recovered leaf");
                Some(Recovery { tier, shape })
            }
            Err(failure) => {
                debug!(leaf = %leaf, tier = tier.as_str(), %failure, "Fallback tier failed");
                None
            }
        }
    }

    fn marker(&self, leaf: LeafId, tally: &mut TierTally) -> Recovery {
        tally.record_attempt(FallbackTier::Marker);
        tally.record_success(FallbackTier::Marker);
        debug!(leaf = %leaf, tier = "marker", "Recovered leaf");
        Recovery {
            tier: FallbackTier::Marker,
            shape: OutputShape::Marker,
        }
    }

    /// Tier 1: keep every edge polyline with at least two distinct points
    fn extract_edges(&self, payload: &GeometryPayload) -> Result<OutputShape, TierFailure> {
        let polylines = payload.edge_polylines();
        let mut non_finite = 0;
        let mut usable = Vec::new();

        for polyline in polylines {
            if polyline.iter().any(|p| !is_finite(p)) {
                non_finite += 1;
                continue;
            }
            let cleaned = self.dedup_consecutive(polyline);
            if cleaned.len() >= 2 {
                usable.push(cleaned);
            }
        }

        if usable.is_empty() {
            return Err(if non_finite > 0 {
                TierFailure::NonFinite("edge curves")
            } else {
                TierFailure::NoUsableEdges
            });
        }
        Ok(OutputShape::Wireframe(usable))
    }

    /// Tier 2: fan-triangulate the distinct vertices still recoverable
    fn tessellate(&self, payload: &GeometryPayload) -> Result<OutputShape, TierFailure> {
        let mut patch = Mesh::new();
        let mut seen = 0;
        for point in payload.points() {
            seen += 1;
            if is_finite(point) {
                patch.add_vertex(Vertex::at(*point));
            }
        }
        if seen > 0 && patch.vertex_count() == 0 {
            return Err(TierFailure::NonFinite("vertices"));
        }

        patch.weld_vertices(self.weld_epsilon);
        let count = patch.vertex_count();
        if count < 3 {
            return Err(TierFailure::TooFewVertices(count));
        }

        for i in 1..count - 1 {
            let p0 = &patch.vertices[0].position;
            let p1 = &patch.vertices[i].position;
            let p2 = &patch.vertices[i + 1].position;
            if triangle_area(p0, p1, p2) > MIN_PATCH_AREA {
                patch.add_triangle(Triangle::new([0, i, i + 1]));
            }
        }
        if patch.triangle_count() == 0 {
            return Err(TierFailure::CollinearVertices);
        }

        patch.recompute_normals();
        Ok(OutputShape::Patch(patch))
    }

    fn dedup_consecutive(&self, polyline: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
        let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(polyline.len());
        for point in polyline {
            match cleaned.last() {
                Some(last) if (point - last).norm() <= self.weld_epsilon => {}
                _ => cleaned.push(point),
            }
        }
        cleaned
    }
}

fn is_finite(point: &Point3<f64>) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}
