// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - leaf payloads, placements and measures

mod bbox;
mod mesh;
mod metrics;
mod payload;
mod primitives;
mod transform;

pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle, Vertex};
pub use metrics::LeafMetrics;
pub use payload::{Curve, Edge, Face, GeometryPayload, Solid};
pub use primitives::Primitive;
pub use transform::{Transform, TransformComposer, TransformOp};
