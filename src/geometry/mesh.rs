// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities
//!
//! Meshes read from foreign files are not trusted: triangles may reference
//! vertices that do not exist. Every accessor here skips such triangles
//! instead of panicking.

use super::Transform;
use crate::utils::math::{triangle_area, triangle_normal};
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Distance under which two positions count as the same corner when
/// checking whether a mesh is closed
const SEAM_EPSILON: f64 = 1e-9;

fn default_normal() -> Vector3<f64> {
    Vector3::z()
}

/// Grid cell holding `position` for a cell edge of `cell`
fn grid_cell(position: &Point3<f64>, cell: f64) -> [i64; 3] {
    [
        (position.x / cell).floor() as i64,
        (position.y / cell).floor() as i64,
        (position.z / cell).floor() as i64,
    ]
}

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    #[serde(default = "default_normal")]
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, default_normal())
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles whose indices all point at existing vertices, as positions
    pub fn valid_triangles(&self) -> impl Iterator<Item = [&Point3<f64>; 3]> + '_ {
        self.triangles.iter().filter_map(move |t| {
            let [a, b, c] = t.indices;
            Some([
                &self.vertices.get(a)?.position,
                &self.vertices.get(b)?.position,
                &self.vertices.get(c)?.position,
            ])
        })
    }

    /// Distinct undirected edges of the valid triangles, in first-seen order
    pub fn unique_edges(&self) -> Vec<(usize, usize)> {
        let mut seen = AHashSet::new();
        let mut edges = Vec::new();
        for triangle in &self.triangles {
            let indices = &triangle.indices;
            if indices.iter().any(|&i| i >= self.vertices.len()) {
                continue;
            }
            for i in 0..3 {
                let v1 = indices[i];
                let v2 = indices[(i + 1) % 3];
                if v1 == v2 {
                    continue;
                }
                // Normalize edge (smaller index first)
                let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Transform all vertices by a placement
    pub fn transform(&mut self, transform: &Transform) {
        let matrix = transform.matrix();
        // Transform normals with the inverse transpose
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        for vertex in &mut self.vertices {
            vertex.position = matrix.transform_point(&vertex.position);
            let normal = normal_matrix.transform_vector(&vertex.normal);
            vertex.normal = normal.try_normalize(f64::EPSILON).unwrap_or_else(default_normal);
        }
    }

    /// Whether every edge, matched by corner position, borders exactly two
    /// triangles. Triangle soups count as closed when their faces meet.
    pub fn is_closed(&self) -> bool {
        let (corners, _) = self.weld_map(SEAM_EPSILON);
        let mut edge_uses: AHashMap<(usize, usize), u32> = AHashMap::new();
        for triangle in &self.triangles {
            if triangle.indices.iter().any(|&i| i >= corners.len()) {
                continue;
            }
            let [a, b, c] = triangle.indices.map(|i| corners[i]);
            if a == b || b == c || a == c {
                continue;
            }
            for (v1, v2) in [(a, b), (b, c), (c, a)] {
                let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
                *edge_uses.entry(edge).or_insert(0) += 1;
            }
        }
        !edge_uses.is_empty() && edge_uses.values().all(|&uses| uses == 2)
    }

    /// Enclosed volume, or zero when the mesh is open.
    ///
    /// Tetrahedra are taken against the first valid corner, not the origin,
    /// so the result does not drift with where the mesh sits.
    pub fn volume(&self) -> f64 {
        let Some(reference) = self.valid_triangles().next().map(|[p, _, _]| *p) else {
            return 0.0;
        };
        if !self.is_closed() {
            return 0.0;
        }
        let signed: f64 = self
            .valid_triangles()
            .map(|[v0, v1, v2]| {
                let (a, b, c) = (*v0 - reference, *v1 - reference, *v2 - reference);
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum();
        signed.abs()
    }

    pub fn surface_area(&self) -> f64 {
        self.valid_triangles()
            .map(|[v0, v1, v2]| triangle_area(v0, v1, v2))
            .sum()
    }

    /// Weld vertices that are within epsilon distance of each other.
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let (new_indices, kept) = self.weld_map(epsilon);

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                if let Some(&mapped) = new_indices.get(*index) {
                    *index = mapped;
                }
            }
        }

        let vertices: Vec<Vertex> = kept.into_iter().map(|i| self.vertices[i]).collect();
        self.vertices = vertices;
        original_count - self.vertices.len()
    }

    /// Map every vertex to the first earlier vertex within `epsilon`.
    ///
    /// Returns the new index of each vertex and the original indices of the
    /// vertices that survive. Candidates are looked up in a hash grid with
    /// `epsilon`-sized cells, so only the 27 surrounding cells are scanned.
    fn weld_map(&self, epsilon: f64) -> (Vec<usize>, Vec<usize>) {
        let cell = if epsilon > 0.0 && epsilon.is_finite() {
            epsilon
        } else {
            f64::EPSILON
        };
        let mut new_indices = Vec::with_capacity(self.vertices.len());
        let mut kept: Vec<usize> = Vec::new();
        let mut grid: AHashMap<[i64; 3], Vec<usize>> = AHashMap::new();

        for vertex in &self.vertices {
            let position = &vertex.position;
            let [x, y, z] = grid_cell(position, cell);
            let mut found: Option<usize> = None;
            for dx in -1..=1i64 {
                for dy in -1..=1i64 {
                    for dz in -1..=1i64 {
                        let key = [x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)];
                        let Some(bucket) = grid.get(&key) else {
                            continue;
                        };
                        for &j in bucket {
                            let near = (*position - self.vertices[kept[j]].position).norm() <= epsilon;
                            if near && found.map_or(true, |f| j < f) {
                                found = Some(j);
                            }
                        }
                    }
                }
            }

            let index = match found {
                Some(j) => j,
                None => {
                    let j = kept.len();
                    kept.push(new_indices.len());
                    grid.entry([x, y, z]).or_default().push(j);
                    j
                }
            };
            new_indices.push(index);
        }
        (new_indices, kept)
    }

    /// Recompute vertex normals as area-weighted face normal averages
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [i0, i1, i2] = triangle.indices;
            let (Some(v0), Some(v1), Some(v2)) = (
                self.vertices.get(i0),
                self.vertices.get(i1),
                self.vertices.get(i2),
            ) else {
                continue;
            };
            // Unnormalized cross product is already area-weighted
            let face_normal = triangle_normal(&v0.position, &v1.position, &v2.position);
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle.indices {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(1e-12).unwrap_or_else(default_normal);
        }
    }
}
