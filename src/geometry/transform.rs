// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Affine placement transforms and the composer that validates them

use crate::error::RejectedTransform;
use nalgebra::{Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Affine placement stored as a homogeneous 4x4 matrix.
///
/// Deserializes from either a 16-element column-major matrix or a list of
/// [`TransformOp`]s; always serializes as the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformRepr", into = "TransformRepr")]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_matrix(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Self {
        Self::from_matrix(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    /// Rotation from Euler angles in degrees (applied X, then Y, then Z)
    pub fn rotation_degrees(x: f64, y: f64, z: f64) -> Self {
        TransformOp::Rotate(Vector3::new(x, y, z)).to_transform()
    }

    /// Fold a list of operations left-to-right: `ops[0] * ops[1] * ...`
    pub fn from_ops(ops: &[TransformOp]) -> Self {
        ops.iter()
            .fold(Self::identity(), |acc, op| acc.then(&op.to_transform()))
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Determinant of the linear (upper-left 3x3) part
    pub fn determinant(&self) -> f64 {
        let linear: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        linear.determinant()
    }

    /// Length each local axis is stretched to: column norms of the linear part
    pub fn axis_scales(&self) -> Vector3<f64> {
        let linear = self.matrix.fixed_view::<3, 3>(0, 0);
        Vector3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    /// Unchecked composition `self ∘ local`
    pub fn then(&self, local: &Transform) -> Transform {
        Transform::from_matrix(self.matrix * local.matrix)
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// World position of the local origin
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transformation operations accepted in scene files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransformOp {
    Translate(Vector3<f64>),
    /// Euler angles in degrees
    Rotate(Vector3<f64>),
    Scale(Vector3<f64>),
    Mirror(Vector3<f64>),
    Multmatrix(Matrix4<f64>),
}

impl TransformOp {
    pub fn to_transform(&self) -> Transform {
        let matrix = match self {
            TransformOp::Translate(v) => Matrix4::new_translation(v),
            TransformOp::Rotate(angles) => {
                let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x.to_radians());
                let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y.to_radians());
                let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z.to_radians());
                (rz * ry * rx).to_homogeneous()
            }
            TransformOp::Scale(s) => Matrix4::new_nonuniform_scaling(s),
            TransformOp::Mirror(axis) => {
                let mut m = Matrix4::identity();
                if axis.x != 0.0 {
                    m[(0, 0)] = -1.0;
                }
                if axis.y != 0.0 {
                    m[(1, 1)] = -1.0;
                }
                if axis.z != 0.0 {
                    m[(2, 2)] = -1.0;
                }
                m
            }
            TransformOp::Multmatrix(m) => *m,
        };
        Transform::from_matrix(matrix)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TransformRepr {
    Matrix(Matrix4<f64>),
    Ops(Vec<TransformOp>),
}

impl From<TransformRepr> for Transform {
    fn from(repr: TransformRepr) -> Self {
        match repr {
            TransformRepr::Matrix(m) => Transform::from_matrix(m),
            TransformRepr::Ops(ops) => Transform::from_ops(&ops),
        }
    }
}

impl From<Transform> for TransformRepr {
    fn from(transform: Transform) -> Self {
        TransformRepr::Matrix(transform.matrix)
    }
}

/// Composes placements along a traversal path and rejects singular results.
///
/// Only singularity is fatal: extreme but invertible scales pass.
#[derive(Debug, Clone, Copy)]
pub struct TransformComposer {
    epsilon: f64,
}

impl TransformComposer {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Compute `parent ∘ local`, rejecting it if `|det| < epsilon`
    pub fn compose(
        &self,
        parent: &Transform,
        local: &Transform,
    ) -> Result<Transform, RejectedTransform> {
        self.validate(parent.then(local))
    }

    /// Accept a transform only if it is finite and non-singular
    pub fn validate(&self, transform: Transform) -> Result<Transform, RejectedTransform> {
        let determinant = transform.determinant();
        if !transform.is_finite() || !determinant.is_finite() || determinant.abs() < self.epsilon
        {
            return Err(RejectedTransform { determinant });
        }
        Ok(transform)
    }
}
