// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end extraction scenarios

use approx::assert_relative_eq;
use instaflat::geometry::{Curve, Edge, Solid};
use instaflat::output::OutputShape;
use instaflat::{
    extract, GeometryPayload, Kernel, MemorySink, ObjectCategory, OutputItem,
    OutputSink, Primitive, SceneGraph, SceneNode, SinkError, Transform,
};
use instaflat::output::ObjectHandle;
use nalgebra::{Point3, Vector3};

fn block() -> SceneNode {
    SceneNode::leaf(GeometryPayload::Solid(
        Primitive::cuboid(Vector3::new(1.0, 1.0, 2.0)).to_solid(),
    ))
}

/// Two identical 1x1x2 blocks under a reusable part, placed by `placements`
fn two_block_scene(placements: Vec<Transform>) -> SceneGraph {
    let instances = placements
        .into_iter()
        .map(|t| SceneNode::instance("part", t))
        .collect();
    SceneGraph::new(SceneNode::assembly(instances))
        .with_subgraph("part", SceneNode::assembly(vec![block(), block()]))
}

/// Records every item it accepts
#[derive(Default)]
struct RecordingSink {
    shapes: Vec<(ObjectCategory, OutputShape, Point3<f64>)>,
}

impl OutputSink for RecordingSink {
    fn create_object(
        &mut self,
        category: ObjectCategory,
        items: &[OutputItem<'_>],
    ) -> Result<ObjectHandle, SinkError> {
        for item in items {
            self.shapes
                .push((category, item.shape.clone(), item.placement.origin()));
        }
        Ok(ObjectHandle(self.shapes.len() as u64))
    }
}

#[test]
fn test_instanced_part_is_one_group() -> anyhow::Result<()> {
    let graph = two_block_scene(vec![
        Transform::identity(),
        Transform::translation(50.0, 0.0, 0.0),
    ]);
    let mut sink = MemorySink::new();
    let report = extract(&graph, &mut sink)?;

    assert_eq!(report.total_leaves, 4);
    assert_eq!(report.groups_found, 1);
    assert_eq!(report.rejected_transforms, 0);
    assert_eq!(report.valid, 4);
    assert_eq!(report.max_depth, 1);
    assert_eq!(report.instances_visited, 2);
    assert_relative_eq!(report.groups[0].representative.rounded_volume, 2.0);
    assert_eq!(report.groups[0].representative.sorted_bbox_dims, [2.0, 1.0, 1.0]);
    assert_eq!(sink.objects().len(), 4);
    Ok(())
}

#[test]
fn test_near_singular_instance_is_rejected() -> anyhow::Result<()> {
    // det = 1e-12
    let graph = two_block_scene(vec![
        Transform::identity(),
        Transform::scaling(1e-4, 1e-4, 1e-4),
    ]);
    let report = extract(&graph, &mut MemorySink::new())?;

    assert_eq!(report.total_leaves, 2);
    assert_eq!(report.rejected_transforms, 1);
    assert_eq!(report.groups.iter().map(|g| g.members.len()).sum::<usize>(), 2);
    Ok(())
}

#[test]
fn test_zero_determinant_contributes_nothing() -> anyhow::Result<()> {
    let graph = two_block_scene(vec![Transform::scaling(0.0, 1.0, 1.0)]);
    let mut sink = MemorySink::new();
    let report = extract(&graph, &mut sink)?;

    assert_eq!(report.total_leaves, 0);
    assert_eq!(report.groups_found, 0);
    assert_eq!(report.rejected_transforms, 1);
    assert_eq!(sink.calls(), 0);
    Ok(())
}

#[test]
fn test_open_sheet_is_surface_only() -> anyhow::Result<()> {
    let graph = SceneGraph::new(SceneNode::leaf(GeometryPayload::Solid(
        Primitive::sheet(4.0, 2.0).to_solid(),
    )));
    let mut sink = MemorySink::new();
    let report = extract(&graph, &mut sink)?;

    assert_eq!(report.surface_only, 1);
    assert_eq!(report.degenerate, 0);
    assert_eq!(report.fallback_tier_counts.total(), 0);
    assert_eq!(sink.objects()[0].category, ObjectCategory::Surface);
    Ok(())
}

#[test]
fn test_moved_open_mesh_stays_surface_only() -> anyhow::Result<()> {
    let graph = SceneGraph::new(SceneNode::assembly(vec![
        SceneNode::instance("panel", Transform::identity()),
        SceneNode::instance("panel", Transform::translation(0.0, 0.0, 5.0)),
        SceneNode::instance("panel", Transform::translation(-40.0, 12.0, 10.0)),
    ]))
    .with_subgraph(
        "panel",
        SceneNode::leaf(GeometryPayload::Mesh(Primitive::sheet(1.0, 1.0).to_mesh())),
    );
    let report = extract(&graph, &mut MemorySink::new())?;

    assert_eq!(report.surface_only, 3);
    assert_eq!(report.valid, 0);
    assert_eq!(report.groups_found, 1);
    assert_eq!(report.groups[0].representative.rounded_volume, 0.0);
    Ok(())
}

#[test]
fn test_part_rotated_off_axis_joins_its_group() -> anyhow::Result<()> {
    let graph = SceneGraph::new(SceneNode::assembly(vec![
        SceneNode::instance("brick", Transform::identity()),
        SceneNode::instance("brick", Transform::rotation_degrees(0.0, 0.0, 45.0)),
        SceneNode::instance(
            "brick",
            Transform::translation(9.0, 0.0, 0.0).then(&Transform::rotation_degrees(30.0, 10.0, 73.0)),
        ),
    ]))
    .with_subgraph(
        "brick",
        SceneNode::leaf(GeometryPayload::Solid(
            Primitive::cuboid(Vector3::new(1.0, 2.0, 3.0)).to_solid(),
        )),
    );
    let report = extract(&graph, &mut MemorySink::new())?;

    assert_eq!(report.valid, 3);
    assert_eq!(report.groups_found, 1);
    assert_eq!(report.groups[0].representative.sorted_bbox_dims, [3.0, 2.0, 1.0]);
    Ok(())
}

#[test]
fn test_wire_leaf_recovers_at_edge_tier_only() -> anyhow::Result<()> {
    let wire = GeometryPayload::Solid(Solid {
        faces: vec![],
        edges: vec![
            Edge::segment(Point3::origin(), Point3::new(1.0, 0.0, 0.0)),
            Edge::segment(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)),
        ],
        volume: 0.0,
        surface_area: 0.0,
    });
    let graph = SceneGraph::new(SceneNode::leaf(wire));
    let mut sink = RecordingSink::default();
    let report = Kernel::default().run(&graph, &mut sink)?;

    assert_eq!(report.degenerate, 1);
    assert_eq!(report.fallback_tier_counts.edges, 1);
    assert_eq!(report.fallback_tier_counts.tessellation, 0);
    assert_eq!(report.fallback_tier_counts.marker, 0);
    assert!(matches!(
        sink.shapes[0],
        (ObjectCategory::Wireframe, OutputShape::Wireframe(ref lines), _) if lines.len() == 2
    ));
    Ok(())
}

#[test]
fn test_unrepresentable_leaf_becomes_placed_marker() -> anyhow::Result<()> {
    let dot = GeometryPayload::Curve(Curve {
        points: vec![Point3::new(3.0, 3.0, 3.0)],
        closed: false,
    });
    let graph = SceneGraph::new(SceneNode::instance("dot", Transform::translation(7.0, 8.0, 9.0)))
        .with_subgraph("dot", SceneNode::leaf(dot));
    let mut sink = RecordingSink::default();
    let report = Kernel::default().run(&graph, &mut sink)?;

    assert_eq!(report.fallback_tier_counts.marker, 1);
    let (category, shape, origin) = &sink.shapes[0];
    assert_eq!(*category, ObjectCategory::Marker);
    assert_eq!(*shape, OutputShape::Marker);
    assert_eq!(*origin, Point3::new(7.0, 8.0, 9.0));
    Ok(())
}

#[test]
fn test_nested_instances_compose_in_order() -> anyhow::Result<()> {
    // row of 3 parts, instanced twice: 6 placements of a single block
    let graph = SceneGraph::new(SceneNode::assembly(vec![
        SceneNode::instance("row", Transform::identity()),
        SceneNode::instance("row", Transform::translation(0.0, 10.0, 0.0)),
    ]))
    .with_subgraph(
        "row",
        SceneNode::assembly(
            (0..3)
                .map(|i| SceneNode::instance("part", Transform::translation(i as f64 * 5.0, 0.0, 0.0)))
                .collect(),
        ),
    )
    .with_subgraph("part", block());

    let mut sink = RecordingSink::default();
    let report = Kernel::default().run(&graph, &mut sink)?;

    assert_eq!(report.total_leaves, 6);
    assert_eq!(report.groups_found, 1);
    assert_eq!(report.max_depth, 2);
    assert_eq!(report.per_depth[2].leaves, 6);
    let origins: Vec<_> = sink.shapes.iter().map(|(_, _, o)| *o).collect();
    assert_eq!(origins[0], Point3::new(0.0, 0.0, 0.0));
    assert_eq!(origins[2], Point3::new(10.0, 0.0, 0.0));
    assert_eq!(origins[4], Point3::new(5.0, 10.0, 0.0));
    Ok(())
}

#[test]
fn test_recovered_leaves_are_tallied_by_tier() -> anyhow::Result<()> {
    let graph = SceneGraph::new(SceneNode::assembly(vec![
        block(),
        // loose vertices: no edges, tessellates
        SceneNode::leaf(GeometryPayload::Mesh({
            let mut mesh = Primitive::sheet(1.0, 1.0).to_mesh();
            mesh.triangles.clear();
            mesh
        })),
        SceneNode::leaf(GeometryPayload::Solid(Solid {
            faces: vec![],
            edges: vec![],
            volume: 0.0,
            surface_area: 0.0,
        })),
    ]));
    let report = extract(&graph, &mut MemorySink::new())?;

    assert_eq!(report.valid, 1);
    assert_eq!(report.degenerate, 2);
    assert_eq!(report.fallback_tier_counts.tessellation, 1);
    assert_eq!(report.fallback_tier_counts.marker, 1);
    assert!(report.is_consistent());
    Ok(())
}
