// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON scene importer

use crate::scene::SceneGraph;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse a scene graph from JSON text
pub fn import_scene(source: &str) -> Result<SceneGraph> {
    serde_json::from_str(source).context("Failed to parse scene JSON")
}

/// Import a `.json` scene file
pub fn import_scene_file(path: impl AsRef<Path>) -> Result<SceneGraph> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

    import_scene(&source).with_context(|| format!("Failed to import scene file: {}", path.display()))
}
