// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Calculate the (unnormalized) normal of a triangle given three vertices
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2)
}

/// Area of a triangle given three vertices
pub fn triangle_area(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    triangle_normal(p0, p1, p2).norm() / 2.0
}

/// Check if two floats are within `epsilon` of each other (inclusive)
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Size of one quantization step for the given number of decimals
pub fn quantum(decimals: u32) -> f64 {
    10f64.powi(-(decimals as i32))
}

/// Round a value to a fixed number of decimals.
///
/// Non-finite input rounds to `0.0` so it can never poison a comparison.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid -0.0 leaking into serialized fingerprints
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Replace NaN/infinite values with zero
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
