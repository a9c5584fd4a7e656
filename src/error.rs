// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for extraction runs.
//!
//! Only [`ExtractError`] ever reaches the caller of a run. Every other error
//! is local to one subtree or one leaf and ends up as a counter in the
//! report.

use crate::flatten::LeafId;
use thiserror::Error;

/// Result type for a whole extraction run
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Caller-visible failures of an extraction run
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("scene source is unreadable: {0}")]
    SourceUnreadable(String),
}

/// A composed transform collapsed (near-)singular; its subtree is skipped
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("rejected transform with determinant {determinant:e}")]
pub struct RejectedTransform {
    pub determinant: f64,
}

/// One fallback tier could not produce a representation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TierFailure {
    #[error("no edge curve with two distinct points")]
    NoUsableEdges,

    #[error("only {0} distinct vertices recovered, need at least 3")]
    TooFewVertices(usize),

    #[error("recovered vertices are collinear")]
    CollinearVertices,

    #[error("non-finite coordinates in {0}")]
    NonFinite(&'static str),
}

/// A leaf ran out of fallback tiers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("leaf {leaf} has no remaining representation")]
pub struct InvalidGeometry {
    pub leaf: LeafId,
}

/// The output sink refused a creation call. Opaque to the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sink rejected object: {reason}")]
pub struct SinkError {
    pub reason: String,
}

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
