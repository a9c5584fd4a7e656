// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - scene import, report and STL export

mod export_stl;
mod importer;
mod report;

pub use export_stl::StlSink;
pub use importer::{import_scene, import_scene_file};
pub use report::{write_report, TimestampedReport};
