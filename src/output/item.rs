// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::dedup::GroupId;
use crate::fallback::{FallbackTier, Recovery};
use crate::flatten::{FlattenedLeaf, LeafId, Validity};
use crate::geometry::{GeometryPayload, Mesh, Transform};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Kind of object a sink is asked to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectCategory {
    Solid,
    Surface,
    Mesh,
    Curve,
    Wireframe,
    Patch,
    Marker,
    /// Several leaves in one object
    Compound,
}

impl ObjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectCategory::Solid => "solid",
            ObjectCategory::Surface => "surface",
            ObjectCategory::Mesh => "mesh",
            ObjectCategory::Curve => "curve",
            ObjectCategory::Wireframe => "wireframe",
            ObjectCategory::Patch => "patch",
            ObjectCategory::Marker => "marker",
            ObjectCategory::Compound => "compound",
        }
    }
}

/// Representation handed to the sink, in the leaf's local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum OutputShape {
    /// The leaf payload as read from the scene
    Original,
    /// Edge polylines recovered by the first fallback tier
    Wireframe(Vec<Vec<Point3<f64>>>),
    /// Triangulated patch recovered by the second tier
    Patch(Mesh),
    /// Zero-extent placeholder at the local origin
    Marker,
}

/// One leaf ready for emission
#[derive(Debug, Clone)]
pub struct OutputItem<'s> {
    pub leaf: LeafId,
    pub payload: &'s GeometryPayload,
    /// World placement of `shape`
    pub placement: Transform,
    pub shape: OutputShape,
    pub validity: Validity,
    pub group: Option<GroupId>,
    /// Fallback tier that produced `shape`, if any
    pub tier: Option<FallbackTier>,
}

impl<'s> OutputItem<'s> {
    pub fn from_leaf(leaf: &FlattenedLeaf<'s>) -> Self {
        Self {
            leaf: leaf.id,
            payload: leaf.geometry,
            placement: leaf.world_transform,
            shape: OutputShape::Original,
            validity: leaf.validity,
            group: None,
            tier: None,
        }
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Replace the representation with a recovered one
    pub fn with_recovery(&self, recovery: Recovery) -> Self {
        Self {
            shape: recovery.shape,
            tier: Some(recovery.tier),
            ..self.clone()
        }
    }

    pub fn category(&self) -> ObjectCategory {
        match &self.shape {
            OutputShape::Original => match self.payload {
                GeometryPayload::Solid(_) if self.validity == Validity::Valid => ObjectCategory::Solid,
                GeometryPayload::Solid(_) => ObjectCategory::Surface,
                GeometryPayload::Mesh(_) => ObjectCategory::Mesh,
                GeometryPayload::Curve(_) => ObjectCategory::Curve,
            },
            OutputShape::Wireframe(_) => ObjectCategory::Wireframe,
            OutputShape::Patch(_) => ObjectCategory::Patch,
            OutputShape::Marker => ObjectCategory::Marker,
        }
    }

    /// Markers stand in for geometry that could not be represented
    pub fn is_placeholder(&self) -> bool {
        matches!(self.shape, OutputShape::Marker)
    }

    /// Every point of the representation in world coordinates
    pub fn world_points(&self) -> Vec<Point3<f64>> {
        let local: Vec<Point3<f64>> = match &self.shape {
            OutputShape::Original => self.payload.points().copied().collect(),
            OutputShape::Wireframe(polylines) => polylines.iter().flatten().copied().collect(),
            OutputShape::Patch(mesh) => mesh.vertices.iter().map(|v| v.position).collect(),
            OutputShape::Marker => vec![Point3::origin()],
        };
        local
            .iter()
            .map(|p| self.placement.transform_point(p))
            .collect()
    }

    /// World-space triangles of the faceted part of the representation.
    /// Solid face loops are fan-triangulated; curves, wireframes and
    /// markers have none.
    pub fn world_triangles(&self) -> Vec<[Point3<f64>; 3]> {
        let mut local = Vec::new();
        match (&self.shape, self.payload) {
            (OutputShape::Original, GeometryPayload::Solid(solid)) => {
                for face in &solid.faces {
                    if let Some((first, rest)) = face.outer.split_first() {
                        for pair in rest.windows(2) {
                            local.push([*first, pair[0], pair[1]]);
                        }
                    }
                }
            }
            (OutputShape::Original, GeometryPayload::Mesh(mesh)) | (OutputShape::Patch(mesh), _) => {
                local.extend(mesh.valid_triangles().map(|[a, b, c]| [*a, *b, *c]));
            }
            _ => {}
        }
        local
            .into_iter()
            .map(|tri| tri.map(|p| self.placement.transform_point(&p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Curve, Primitive};
    use nalgebra::Vector3;

    fn item(payload: &GeometryPayload, validity: Validity) -> OutputItem<'_> {
        OutputItem {
            leaf: LeafId(0),
            payload,
            placement: Transform::translation(10.0, 0.0, 0.0),
            shape: OutputShape::Original,
            validity,
            group: None,
            tier: None,
        }
    }

    #[test]
    fn test_category_follows_payload_and_validity() {
        let cube = GeometryPayload::Solid(Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0)).to_solid());
        let sheet = GeometryPayload::Solid(Primitive::sheet(1.0, 1.0).to_solid());
        assert_eq!(item(&cube, Validity::Valid).category(), ObjectCategory::Solid);
        assert_eq!(item(&sheet, Validity::SurfaceOnly).category(), ObjectCategory::Surface);

        let marker = item(&cube, Validity::Degenerate).with_recovery(Recovery {
            tier: FallbackTier::Marker,
            shape: OutputShape::Marker,
        });
        assert_eq!(marker.category(), ObjectCategory::Marker);
        assert!(marker.is_placeholder());
        assert_eq!(marker.world_points(), vec![Point3::new(10.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_world_triangles() {
        let cube = GeometryPayload::Solid(Primitive::cuboid(Vector3::new(1.0, 1.0, 1.0)).to_solid());
        let triangles = item(&cube, Validity::Valid).world_triangles();
        assert_eq!(triangles.len(), 12);
        assert!(triangles.iter().flatten().all(|p| p.x >= 10.0 && p.x <= 11.0));

        let curve = GeometryPayload::Curve(Curve {
            points: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            closed: false,
        });
        assert!(item(&curve, Validity::Degenerate).world_triangles().is_empty());
    }
}
