// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Three-way validity classification

use super::Validity;
use crate::geometry::LeafMetrics;

/// Classify a placed leaf.
///
/// Anything without faces is `Degenerate`, whether or not it still has
/// edges; the fallback cascade decides how much of it can be shown.
/// Faces without volume are `SurfaceOnly`, never an error.
pub fn classify(metrics: &LeafMetrics, volume_epsilon: f64) -> Validity {
    if metrics.face_count == 0 {
        Validity::Degenerate
    } else if metrics.volume > volume_epsilon {
        Validity::Valid
    } else {
        Validity::SurfaceOnly
    }
}
