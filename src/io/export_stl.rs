// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL export sink

use crate::error::SinkError;
use crate::output::{ObjectCategory, ObjectHandle, OutputItem, OutputSink};
use crate::utils::math::triangle_normal;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Sink that collects faceted output into one binary STL.
///
/// Wireframes and markers are accepted but contribute no triangles.
/// Nothing is written until [`StlSink::finish`].
pub struct StlSink {
    path: PathBuf,
    triangles: Vec<StlTriangle>,
    objects: u64,
}

impl StlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            triangles: Vec::new(),
            objects: 0,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Write the collected triangles, returning how many were written
    pub fn finish(self) -> Result<usize> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create STL file: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        stl_io::write_stl(&mut writer, self.triangles.iter())
            .with_context(|| format!("Failed to write STL file: {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush STL file: {}", self.path.display()))?;
        Ok(self.triangles.len())
    }
}

fn stl_vertex(p: &Point3<f64>) -> StlVertex {
    StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
}

impl OutputSink for StlSink {
    fn create_object(
        &mut self,
        _category: ObjectCategory,
        items: &[OutputItem<'_>],
    ) -> Result<ObjectHandle, SinkError> {
        let mut batch = Vec::new();
        for item in items {
            for [a, b, c] in item.world_triangles() {
                if ![a, b, c].iter().all(|p| p.coords.iter().all(|v| v.is_finite())) {
                    return Err(SinkError::new(format!("leaf {} has non-finite coordinates", item.leaf)));
                }
                // Normals must come from the triangle's actual geometry
                let normal = triangle_normal(&a, &b, &c).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
                batch.push(StlTriangle {
                    normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                    vertices: [stl_vertex(&a), stl_vertex(&b), stl_vertex(&c)],
                });
            }
        }

        self.triangles.extend(batch);
        let handle = ObjectHandle(self.objects);
        self.objects += 1;
        Ok(handle)
    }
}
