// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Extraction configuration system

use crate::output::BatchMode;
use crate::utils::math::quantum;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`ExtractionConfig::load`]
pub const CONFIG_FILE: &str = "instaflat.toml";

/// Numeric thresholds used across one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Minimum `|det|` of a placement transform
    pub transform_epsilon: f64,
    /// Volume above which a leaf with faces is a real solid
    pub volume_epsilon: f64,
    /// Absolute volume tolerance for grouping
    pub group_volume_tolerance: f64,
    /// Absolute bounding-box dimension tolerance for grouping
    pub group_dimension_tolerance: f64,
    /// Decimals kept in fingerprint volumes
    pub volume_decimals: u32,
    /// Decimals kept in fingerprint dimensions
    pub dimension_decimals: u32,
    /// Distance under which recovered vertices are merged
    pub weld_epsilon: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            transform_epsilon: 1e-9,
            volume_epsilon: 1e-9,
            group_volume_tolerance: 1e-3,
            group_dimension_tolerance: 1e-3,
            volume_decimals: 4,
            dimension_decimals: 4,
            weld_epsilon: 1e-9,
        }
    }
}

impl Tolerances {
    /// Volume slack for fingerprint comparison, including rounding
    pub fn volume_match(&self) -> f64 {
        self.group_volume_tolerance + quantum(self.volume_decimals)
    }

    /// Dimension slack for fingerprint comparison, including rounding
    pub fn dimension_match(&self) -> f64 {
        self.group_dimension_tolerance + quantum(self.dimension_decimals)
    }
}

/// Extraction run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How flattened leaves are bundled into sink calls
    pub batch_mode: BatchMode,
    /// Flatten top-level assembly children on worker threads
    pub parallel: bool,
    pub tolerances: Tolerances,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            batch_mode: BatchMode::PerLeaf,
            parallel: false,
            tolerances: Tolerances::default(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ExtractionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `instaflat.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `INSTAFLAT_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(batch) = std::env::var("INSTAFLAT_BATCH") {
            self.batch_mode = batch
                .parse()
                .with_context(|| format!("Invalid INSTAFLAT_BATCH: {}", batch))?;
        }

        if let Ok(parallel) = std::env::var("INSTAFLAT_PARALLEL") {
            self.parallel = parallel.parse().unwrap_or(false);
        }

        if let Ok(epsilon) = std::env::var("INSTAFLAT_TRANSFORM_EPSILON") {
            self.tolerances.transform_epsilon = epsilon
                .parse()
                .with_context(|| format!("Invalid INSTAFLAT_TRANSFORM_EPSILON: {}", epsilon))?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
