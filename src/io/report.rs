// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON report export

use crate::report::ExtractionReport;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Report as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedReport {
    pub timestamp: String,
    /// Scene file the run was made from
    pub scene: Option<String>,
    #[serde(flatten)]
    pub report: ExtractionReport,
}

impl TimestampedReport {
    pub fn new(report: ExtractionReport, scene: Option<&Path>) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            scene: scene.map(|p| p.display().to_string()),
            report,
        }
    }
}

/// Write a pretty-printed JSON report
pub fn write_report(report: &TimestampedReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}
