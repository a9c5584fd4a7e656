// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene module
//!
//! Read-only view of an imported, instanced CAD scene

mod graph;
mod node;
mod source;

pub use graph::SceneGraph;
pub use node::{SceneNode, SubgraphRef};
pub use source::SceneSource;
