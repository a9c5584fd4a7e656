// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Terminal geometry as read from a foreign CAD model

use super::Mesh;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Planar face bounded by one outer loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub outer: Vec<Point3<f64>>,
}

impl Face {
    pub fn new(outer: Vec<Point3<f64>>) -> Self {
        Self { outer }
    }
}

/// Edge curve approximated by a polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub points: Vec<Point3<f64>>,
}

impl Edge {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn segment(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self::new(vec![a, b])
    }
}

/// Boundary-represented solid. `volume` and `surface_area` are the values
/// the source kernel reported; they are trusted, not recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    #[serde(default)]
    pub faces: Vec<Face>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub surface_area: f64,
}

/// Curve given by its control polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub points: Vec<Point3<f64>>,
    #[serde(default)]
    pub closed: bool,
}

/// Closed set of leaf geometry kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryPayload {
    Solid(Solid),
    Mesh(Mesh),
    Curve(Curve),
}

impl GeometryPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            GeometryPayload::Solid(_) => "solid",
            GeometryPayload::Mesh(_) => "mesh",
            GeometryPayload::Curve(_) => "curve",
        }
    }

    /// Solid faces or mesh triangles
    pub fn face_count(&self) -> usize {
        match self {
            GeometryPayload::Solid(solid) => solid.faces.len(),
            GeometryPayload::Mesh(mesh) => mesh.triangle_count(),
            GeometryPayload::Curve(_) => 0,
        }
    }

    pub fn edge_count(&self) -> usize {
        match self {
            GeometryPayload::Solid(solid) => solid.edges.len(),
            GeometryPayload::Mesh(mesh) => mesh.unique_edges().len(),
            GeometryPayload::Curve(curve) => usize::from(curve.points.len() >= 2),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            GeometryPayload::Mesh(mesh) => mesh.triangle_count(),
            _ => 0,
        }
    }

    /// Every point the representation exposes, in local coordinates
    pub fn points(&self) -> Box<dyn Iterator<Item = &Point3<f64>> + '_> {
        match self {
            GeometryPayload::Solid(solid) => Box::new(
                solid
                    .faces
                    .iter()
                    .flat_map(|f| f.outer.iter())
                    .chain(solid.edges.iter().flat_map(|e| e.points.iter())),
            ),
            GeometryPayload::Mesh(mesh) => Box::new(mesh.vertices.iter().map(|v| &v.position)),
            GeometryPayload::Curve(curve) => Box::new(curve.points.iter()),
        }
    }

    /// Edge curves still exposed by the representation, as local polylines.
    /// Meshes expose their triangle edges; a curve is its own edge.
    pub fn edge_polylines(&self) -> Vec<Vec<Point3<f64>>> {
        match self {
            GeometryPayload::Solid(solid) => {
                solid.edges.iter().map(|e| e.points.clone()).collect()
            }
            GeometryPayload::Mesh(mesh) => mesh
                .unique_edges()
                .into_iter()
                .map(|(a, b)| vec![mesh.vertices[a].position, mesh.vertices[b].position])
                .collect(),
            GeometryPayload::Curve(curve) => {
                let mut points = curve.points.clone();
                if curve.closed {
                    if let Some(&first) = curve.points.first() {
                        points.push(first);
                    }
                }
                vec![points]
            }
        }
    }
}

impl From<Solid> for GeometryPayload {
    fn from(solid: Solid) -> Self {
        GeometryPayload::Solid(solid)
    }
}

impl From<Mesh> for GeometryPayload {
    fn from(mesh: Mesh) -> Self {
        GeometryPayload::Mesh(mesh)
    }
}

impl From<Curve> for GeometryPayload {
    fn from(curve: Curve) -> Self {
        GeometryPayload::Curve(curve)
    }
}
