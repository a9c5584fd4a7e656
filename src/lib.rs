// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! instaflat
//!
//! Flattens instanced CAD scene graphs into independent world-space leaves.
//! Leaves that fail geometric validity are recovered through a fallback
//! cascade, identical parts are grouped by tolerance-aware fingerprints, and
//! the result is handed to an output sink in configurable batches.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fallback;
pub mod flatten;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod output;
pub mod report;
pub mod scene;
pub mod stats;
pub mod utils;

pub use cancel::CancellationToken;
pub use config::{ExtractionConfig, Tolerances};
pub use error::{ExtractError, InvalidGeometry, RejectedTransform, SinkError, TierFailure};
pub use fallback::{FallbackCascade, FallbackTier};
pub use flatten::{FlattenedLeaf, LeafId, Validity};
pub use geometry::{GeometryPayload, Mesh, Primitive, Transform};
pub use io::{import_scene_file, write_report, StlSink};
pub use kernel::Kernel;
pub use output::{BatchMode, MemorySink, ObjectCategory, OutputItem, OutputSink};
pub use report::ExtractionReport;
pub use scene::{SceneGraph, SceneNode, SceneSource, SubgraphRef};

use std::path::Path;

/// Extract `source` into `sink` with the default configuration
pub fn extract<S>(source: &S, sink: &mut dyn OutputSink) -> error::Result<ExtractionReport>
where
    S: SceneSource + Sync + ?Sized,
{
    Kernel::default().run(source, sink)
}

/// Extract a JSON scene file into a fresh [`MemorySink`]
pub fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> anyhow::Result<(ExtractionReport, MemorySink)> {
    let graph = import_scene_file(path)?;
    let mut sink = MemorySink::new();
    let report = Kernel::new(config.clone()).run(&graph, &mut sink)?;
    Ok((report, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_basic_cube() {
        let graph = SceneGraph::new(SceneNode::leaf(GeometryPayload::Solid(
            Primitive::cuboid(Vector3::new(10.0, 10.0, 10.0)).to_solid(),
        )));
        let report = extract(&graph, &mut MemorySink::new());
        assert!(matches!(report, Ok(ref r) if r.valid == 1));
    }
}
