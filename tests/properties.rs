// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Invariants checked over generated scene graphs

use instaflat::dedup::{Fingerprint, GroupSet};
use instaflat::geometry::{Curve, Edge, LeafMetrics, Solid};
use instaflat::{
    ExtractionConfig, GeometryPayload, Kernel, LeafId, MemorySink, ObjectCategory, Primitive,
    SceneGraph, SceneNode, Tolerances, Transform,
};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_leaf(rng: &mut StdRng) -> SceneNode {
    let payload = match rng.gen_range(0..6) {
        0 | 1 => {
            let size = Vector3::new(
                rng.gen_range(1..4u32) as f64,
                rng.gen_range(1..4u32) as f64,
                rng.gen_range(1..4u32) as f64,
            );
            GeometryPayload::Solid(Primitive::cuboid(size).to_solid())
        }
        2 => GeometryPayload::Mesh(Primitive::cuboid(Vector3::new(1.0, 2.0, 1.0)).to_mesh()),
        3 => GeometryPayload::Solid(Primitive::sheet(rng.gen_range(1..3u32) as f64, 1.0).to_solid()),
        4 => GeometryPayload::Solid(Solid {
            faces: vec![],
            edges: vec![Edge::segment(Point3::origin(), Point3::new(0.0, 0.0, 1.0))],
            volume: 0.0,
            surface_area: 0.0,
        }),
        _ => GeometryPayload::Curve(Curve {
            points: vec![Point3::origin()],
            closed: false,
        }),
    };
    SceneNode::leaf(payload)
}

fn random_placement(rng: &mut StdRng) -> Transform {
    if rng.gen_bool(0.1) {
        return Transform::scaling(1e-5, 1.0, 1e-5);
    }
    Transform::translation(
        rng.gen_range(-100.0..100.0),
        rng.gen_range(-100.0..100.0),
        rng.gen_range(-100.0..100.0),
    )
    .then(&random_rotation(rng))
}

fn random_rotation(rng: &mut StdRng) -> Transform {
    Transform::rotation_degrees(
        rng.gen_range(0.0..360.0),
        rng.gen_range(0.0..360.0),
        rng.gen_range(0.0..360.0),
    )
}

/// Parts reference only lower-numbered parts, so the graph is acyclic
fn random_scene(seed: u64) -> SceneGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let part_count: usize = 8;
    let mut graph = SceneGraph::default();

    for p in 0..part_count {
        let mut children: Vec<SceneNode> = (0..rng.gen_range(1..4usize)).map(|_| random_leaf(&mut rng)).collect();
        if p > 0 {
            for _ in 0..rng.gen_range(0..3usize) {
                let target = rng.gen_range(0..p);
                children.push(SceneNode::instance(
                    format!("part{}", target).as_str(),
                    random_placement(&mut rng),
                ));
            }
        }
        graph.insert_subgraph(format!("part{}", p).as_str(), SceneNode::assembly(children));
    }

    let roots = (0..rng.gen_range(4..10usize))
        .map(|_| {
            let target = rng.gen_range(0..part_count);
            SceneNode::instance(format!("part{}", target).as_str(), random_placement(&mut rng))
        })
        .collect();
    graph.root = Some(SceneNode::assembly(roots));
    graph
}

#[test]
fn test_runs_are_deterministic() -> anyhow::Result<()> {
    for seed in 0..16 {
        let graph = random_scene(seed);
        let first = Kernel::default().run(&graph, &mut MemorySink::new())?;
        let second = Kernel::default().run(&graph, &mut MemorySink::new())?;
        assert!(first.counts_eq(&second), "seed {} diverged", seed);
    }
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> anyhow::Result<()> {
    let parallel = Kernel::new(ExtractionConfig {
        parallel: true,
        ..ExtractionConfig::default()
    });
    for seed in 0..16 {
        let graph = random_scene(seed);
        let sequential = Kernel::default().run(&graph, &mut MemorySink::new())?;
        let threaded = parallel.run(&graph, &mut MemorySink::new())?;
        assert!(sequential.counts_eq(&threaded), "seed {} diverged", seed);
    }
    Ok(())
}

#[test]
fn test_every_leaf_is_classified_grouped_and_emitted_once() -> anyhow::Result<()> {
    for seed in 0..16 {
        let graph = random_scene(seed);
        let mut sink = MemorySink::new();
        let report = Kernel::default().run(&graph, &mut sink)?;

        assert!(report.is_consistent(), "seed {}", seed);
        let emitted = sink.leaves();
        let expected: Vec<LeafId> = (0..report.total_leaves).map(LeafId).collect();
        assert_eq!(emitted, expected, "seed {}", seed);
    }
    Ok(())
}

#[test]
fn test_degenerate_leaves_are_always_represented() -> anyhow::Result<()> {
    for seed in 0..16 {
        let graph = random_scene(seed);
        let mut sink = MemorySink::new();
        let report = Kernel::default().run(&graph, &mut sink)?;

        let recovered = sink
            .objects()
            .iter()
            .filter(|o| {
                matches!(
                    o.category,
                    ObjectCategory::Wireframe | ObjectCategory::Patch | ObjectCategory::Marker
                )
            })
            .count();
        assert_eq!(recovered, report.degenerate, "seed {}", seed);
        assert_eq!(report.fallback_tier_counts.total(), report.degenerate);
        assert!(report.batching.dropped.is_empty());
    }
    Ok(())
}

#[test]
fn test_rigidly_placed_copies_share_a_group() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let placements: Vec<SceneNode> = (0..20)
        .map(|_| loop {
            let placement = random_placement(&mut rng);
            if placement.determinant().abs() > 0.5 {
                break SceneNode::instance("bracket", placement);
            }
        })
        .collect();
    let graph = SceneGraph::new(SceneNode::assembly(placements)).with_subgraph(
        "bracket",
        SceneNode::leaf(GeometryPayload::Solid(
            Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0)).to_solid(),
        )),
    );

    let report = Kernel::default().run(&graph, &mut MemorySink::new())?;
    assert_eq!(report.total_leaves, 20);
    assert_eq!(report.groups_found, 1);
    Ok(())
}

/// Cuboid solid with its reported volume set independently of its size
fn block_print(size: Vector3<f64>, volume: f64, placement: &Transform) -> Fingerprint {
    let mut solid = Primitive::cuboid(size).to_solid();
    solid.volume = volume;
    let metrics = LeafMetrics::measure(&GeometryPayload::Solid(solid), placement);
    Fingerprint::of(&metrics, &Tolerances::default())
}

#[test]
fn test_measured_parts_group_within_tolerance() {
    let tolerances = Tolerances::default();
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..300 {
        // axes kept well apart so nudges never reorder the sorted extents
        let size = Vector3::new(
            rng.gen_range(12.0..20.0),
            rng.gen_range(6.0..10.0),
            rng.gen_range(1.0..5.0),
        );
        let volume = rng.gen_range(0.0..100.0);

        let within = tolerances
            .group_volume_tolerance
            .min(tolerances.group_dimension_tolerance)
            * 0.99;
        let nudge = |rng: &mut StdRng| rng.gen_range(-within..within);
        let near_size = size + Vector3::new(nudge(&mut rng), nudge(&mut rng), nudge(&mut rng));
        let near_volume = volume + nudge(&mut rng);

        let field: usize = rng.gen_range(0..4);
        let jump = tolerances.group_dimension_tolerance * rng.gen_range(10.5..50.0);
        let (mut far_size, mut far_volume) = (size, volume);
        match field {
            0 => far_volume += tolerances.group_volume_tolerance * rng.gen_range(10.5..50.0),
            axis => far_size[axis - 1] += jump,
        }

        let mut groups = GroupSet::new(tolerances);
        let a = groups.assign_group(block_print(size, volume, &random_rotation(&mut rng)), LeafId(0));
        let b = groups.assign_group(
            block_print(near_size, near_volume, &random_rotation(&mut rng)),
            LeafId(1),
        );
        let c = groups.assign_group(
            block_print(far_size, far_volume, &random_rotation(&mut rng)),
            LeafId(2),
        );
        assert_eq!(a, b, "size {:?} near {:?}", size, near_size);
        assert_ne!(a, c, "size {:?} far {:?}", size, far_size);
    }
}

#[test]
fn test_grouping_tolerance_bounds() {
    let tolerances = Tolerances::default();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let base = Fingerprint {
            rounded_volume: rng.gen_range(0.0..100.0),
            sorted_bbox_dims: [
                rng.gen_range(10.0..20.0),
                rng.gen_range(5.0..10.0),
                rng.gen_range(0.0..5.0),
            ],
            face_count: 6,
            edge_count: 12,
        };

        let within = tolerances.group_volume_tolerance * 0.9;
        let mut near = base;
        near.rounded_volume += rng.gen_range(-within..within);
        for d in near.sorted_bbox_dims.iter_mut() {
            *d += rng.gen_range(-within..within);
        }

        let mut far = base;
        let field: usize = rng.gen_range(0..4);
        let jump = tolerances.group_dimension_tolerance * rng.gen_range(10.5..50.0);
        if field == 0 {
            far.rounded_volume += tolerances.group_volume_tolerance * 10.5;
        } else {
            far.sorted_bbox_dims[field - 1] += jump;
        }

        let mut groups = GroupSet::new(tolerances);
        let a = groups.assign_group(base, LeafId(0));
        let b = groups.assign_group(near, LeafId(1));
        let c = groups.assign_group(far, LeafId(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
