// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! World-space measures of a placed leaf

use super::{BoundingBox, GeometryPayload, Transform};
use crate::utils::math::finite_or_zero;
use serde::{Deserialize, Serialize};

/// Derived measures of one leaf under its world transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafMetrics {
    /// Enclosed volume in cubic units
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    pub face_count: usize,
    pub edge_count: usize,
    pub triangle_count: usize,
    /// World axis-aligned box
    pub bbox: BoundingBox,
    /// Local box extents stretched by the placement's axis scales, largest
    /// first. Unlike `bbox` this does not change when the part is rotated.
    pub extents: [f64; 3],
}

impl LeafMetrics {
    /// Measure `payload` as placed by `transform`.
    ///
    /// Solids scale their reported measures by the transform (exact for
    /// rigid and uniformly scaled placements). Mesh volume is taken in the
    /// local frame and scaled by `|det|`; mesh area is measured on the
    /// transformed triangles.
    pub fn measure(payload: &GeometryPayload, transform: &Transform) -> Self {
        let det = finite_or_zero(transform.determinant()).abs();
        let (volume, surface_area) = match payload {
            GeometryPayload::Solid(solid) => (
                finite_or_zero(solid.volume).abs() * det,
                finite_or_zero(solid.surface_area).abs() * det.powf(2.0 / 3.0),
            ),
            GeometryPayload::Mesh(mesh) => {
                let mut placed = mesh.clone();
                placed.transform(transform);
                (mesh.volume() * det, placed.surface_area())
            }
            GeometryPayload::Curve(_) => (0.0, 0.0),
        };

        let world_points: Vec<_> = payload
            .points()
            .map(|p| transform.transform_point(p))
            .collect();
        let local = BoundingBox::from_points(payload.points());

        Self {
            volume: finite_or_zero(volume),
            surface_area: finite_or_zero(surface_area),
            face_count: payload.face_count(),
            edge_count: payload.edge_count(),
            triangle_count: payload.triangle_count(),
            bbox: BoundingBox::from_points(world_points.iter()),
            extents: placed_extents(&local, transform),
        }
    }
}

fn placed_extents(local: &BoundingBox, transform: &Transform) -> [f64; 3] {
    let stretched = local.size().component_mul(&transform.axis_scales());
    let mut dims = [stretched.x, stretched.y, stretched.z].map(finite_or_zero);
    dims.sort_by(|a, b| b.total_cmp(a));
    dims
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Solid};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_solid_measures_follow_scale() {
        let payload = GeometryPayload::Solid(Primitive::cuboid(Vector3::new(1.0, 1.0, 2.0)).to_solid());
        let metrics = LeafMetrics::measure(&payload, &Transform::scaling(2.0, 2.0, 2.0));
        assert_relative_eq!(metrics.volume, 16.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.surface_area, 40.0, epsilon = 1e-9);
        assert_eq!(metrics.bbox.sorted_dims(), [4.0, 2.0, 2.0]);
        assert_eq!(metrics.extents, [4.0, 2.0, 2.0]);
    }

    #[test]
    fn test_extents_survive_arbitrary_rotation() {
        let payload = GeometryPayload::Solid(Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0)).to_solid());
        let turned = Transform::translation(-3.0, 8.0, 1.5).then(&Transform::rotation_degrees(0.0, 0.0, 45.0));
        let metrics = LeafMetrics::measure(&payload, &turned);
        assert_relative_eq!(metrics.extents[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.extents[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.extents[2], 1.0, epsilon = 1e-12);
        // the world box grows under the same turn
        assert!(metrics.bbox.sorted_dims()[1] > 2.1);
    }

    #[test]
    fn test_open_mesh_volume_ignores_position() {
        let payload = GeometryPayload::Mesh(Primitive::sheet(1.0, 1.0).to_mesh());
        for z in [0.0, 5.0, 10.0] {
            let metrics = LeafMetrics::measure(&payload, &Transform::translation(0.0, 0.0, z));
            assert_eq!(metrics.volume, 0.0);
            assert_relative_eq!(metrics.surface_area, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mesh_measured_in_world_space() {
        let payload = GeometryPayload::Mesh(Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0)).to_mesh());
        let metrics = LeafMetrics::measure(&payload, &Transform::translation(100.0, 0.0, 0.0));
        assert_relative_eq!(metrics.volume, 6.0, epsilon = 1e-6);
        assert_relative_eq!(metrics.bbox.min.x, 100.0);
        assert_eq!(metrics.face_count, 12);
        // triangle soup: no shared vertex indices
        assert_eq!(metrics.edge_count, 36);
    }

    #[test]
    fn test_garbage_reported_volume_is_sanitized() {
        let payload = GeometryPayload::Solid(Solid {
            faces: vec![],
            edges: vec![],
            volume: f64::NAN,
            surface_area: f64::INFINITY,
        });
        let metrics = LeafMetrics::measure(&payload, &Transform::identity());
        assert_eq!(metrics.volume, 0.0);
        assert_eq!(metrics.surface_area, 0.0);
        assert!(metrics.bbox.is_empty());
    }
}
