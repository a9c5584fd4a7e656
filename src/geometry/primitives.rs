// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Primitive part builders used for fixtures, benches and demo scenes

use super::{Edge, Face, Mesh, Solid, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

/// Simple parts with exact analytic measures
pub enum Primitive {
    /// Box spanning `0..size` on each axis
    Cuboid { size: Vector3<f64> },
    /// Zero-thickness rectangle in the XY plane spanning `0..width`, `0..depth`
    Sheet { width: f64, depth: f64 },
}

impl Primitive {
    pub fn cuboid(size: Vector3<f64>) -> Self {
        Self::Cuboid { size }
    }

    pub fn sheet(width: f64, depth: f64) -> Self {
        Self::Sheet { width, depth }
    }

    /// Boundary representation: one face per side, one edge per corner pair
    pub fn to_solid(&self) -> Solid {
        match self {
            Self::Cuboid { size } => {
                let p = cuboid_corners(*size);
                let faces = CUBOID_QUADS
                    .iter()
                    .map(|quad| Face::new(quad.iter().map(|&i| p[i]).collect()))
                    .collect();
                let edges = CUBOID_EDGES
                    .iter()
                    .map(|&(a, b)| Edge::segment(p[a], p[b]))
                    .collect();
                Solid {
                    faces,
                    edges,
                    volume: size.x * size.y * size.z,
                    surface_area: 2.0 * (size.x * size.y + size.y * size.z + size.x * size.z),
                }
            }
            Self::Sheet { width, depth } => {
                let p = sheet_corners(*width, *depth);
                let edges = (0..4).map(|i| Edge::segment(p[i], p[(i + 1) % 4])).collect();
                Solid {
                    faces: vec![Face::new(p.to_vec())],
                    edges,
                    volume: 0.0,
                    surface_area: width * depth,
                }
            }
        }
    }

    /// Triangle soup with per-face normals
    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cuboid { size } => generate_cuboid_mesh(*size),
            Self::Sheet { width, depth } => {
                let p = sheet_corners(*width, *depth);
                let mut mesh = Mesh::with_capacity(4, 2);
                for corner in p {
                    mesh.add_vertex(Vertex::new(corner, Vector3::z()));
                }
                mesh.add_triangle(Triangle::new([0, 1, 2]));
                mesh.add_triangle(Triangle::new([0, 2, 3]));
                mesh
            }
        }
    }
}

// Quads wound counter-clockwise seen from outside
const CUBOID_QUADS: [[usize; 4]; 6] = [
    [4, 5, 6, 7], // z+
    [1, 0, 3, 2], // z-
    [5, 1, 2, 6], // x+
    [0, 4, 7, 3], // x-
    [7, 6, 2, 3], // y+
    [0, 1, 5, 4], // y-
];

const CUBOID_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn cuboid_corners(size: Vector3<f64>) -> [Point3<f64>; 8] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(size.x, 0.0, 0.0),
        Point3::new(size.x, size.y, 0.0),
        Point3::new(0.0, size.y, 0.0),
        Point3::new(0.0, 0.0, size.z),
        Point3::new(size.x, 0.0, size.z),
        Point3::new(size.x, size.y, size.z),
        Point3::new(0.0, size.y, size.z),
    ]
}

fn sheet_corners(width: f64, depth: f64) -> [Point3<f64>; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(width, 0.0, 0.0),
        Point3::new(width, depth, 0.0),
        Point3::new(0.0, depth, 0.0),
    ]
}

fn generate_cuboid_mesh(size: Vector3<f64>) -> Mesh {
    let positions = cuboid_corners(size);
    let normals = [
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
    ];

    let mut mesh = Mesh::with_capacity(36, 12);
    for (quad, normal) in CUBOID_QUADS.iter().zip(normals) {
        for indices in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
            let v0 = mesh.add_vertex(Vertex::new(positions[indices[0]], normal));
            let v1 = mesh.add_vertex(Vertex::new(positions[indices[1]], normal));
            let v2 = mesh.add_vertex(Vertex::new(positions[indices[2]], normal));
            mesh.add_triangle(Triangle::new([v0, v1, v2]));
        }
    }
    mesh
}
