// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for extraction runs

use crate::cancel::CancellationToken;
use crate::config::ExtractionConfig;
use crate::dedup::{Fingerprint, GroupSet};
use crate::error::Result;
use crate::fallback::FallbackCascade;
use crate::flatten::{FlattenedLeaf, Flattener, Validity};
use crate::geometry::Transform;
use crate::output::{Batcher, OutputItem, OutputSink};
use crate::report::{BatchSummary, ExtractionReport};
use crate::scene::SceneSource;
use crate::stats::ExtractionStats;
use std::time::Instant;
use tracing::{debug, info};

/// Main kernel: flatten, recover, group and emit one scene
pub struct Kernel {
    config: ExtractionConfig,
    cancel: CancellationToken,
    /// Token came from the caller and is never cleared here
    shared_cancel: bool,
}

impl Kernel {
    /// Create a new kernel
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            shared_cancel: false,
        }
    }

    /// Share an externally owned cancellation flag. The kernel never
    /// clears it, so once cancelled every later run stops at once.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self.shared_cancel = true;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Token that stops the current (or next) run between leaves.
    ///
    /// A kernel-owned token is cleared when a run finishes, so one
    /// cancellation stops one run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one extraction of `source` into `sink`.
    ///
    /// Only an unreadable source fails the run. Everything else is counted
    /// in the returned report.
    pub fn run<S>(&self, source: &S, sink: &mut dyn OutputSink) -> Result<ExtractionReport>
    where
        S: SceneSource + Sync + ?Sized,
    {
        let start = Instant::now();
        let tolerances = self.config.tolerances;
        let root = source.root()?;

        info!(
            batch_mode = %self.config.batch_mode,
            parallel = self.config.parallel,
            "Starting extraction"
        );

        let mut stats = ExtractionStats::new();
        let flattener = Flattener::new(source, &tolerances).with_cancellation(self.cancel.clone());
        let leaves: Vec<FlattenedLeaf<'_>> = if self.config.parallel {
            flattener.flatten_parallel(root, Transform::identity(), &mut stats)
        } else {
            flattener
                .flatten(root, Transform::identity(), 0, &mut stats)
                .collect()
        };
        debug!(leaves = leaves.len(), "Flattened scene");

        let cascade = FallbackCascade::new(tolerances.weld_epsilon);
        let mut groups = GroupSet::new(tolerances);
        let items: Vec<OutputItem<'_>> = leaves
            .iter()
            .map(|leaf| {
                let group = groups.assign_group(Fingerprint::of(&leaf.metrics, &tolerances), leaf.id);
                let item = OutputItem::from_leaf(leaf).with_group(group);
                if leaf.validity == Validity::Degenerate {
                    item.with_recovery(cascade.recover(leaf.id, leaf.geometry, &mut stats.fallback))
                } else {
                    item
                }
            })
            .collect();

        let batcher = Batcher::new(self.config.batch_mode, cascade).with_cancellation(self.cancel.clone());
        let batch = batcher.emit(&items, sink);
        if self.cancel.is_cancelled() {
            stats.cancelled = true;
            if !self.shared_cancel {
                self.cancel.reset();
            }
        }

        let report = ExtractionReport::new(
            &stats,
            groups.into_groups(),
            BatchSummary::new(batcher.mode(), &batch),
            start.elapsed(),
        );

        info!(
            leaves = report.total_leaves,
            valid = report.valid,
            surface_only = report.surface_only,
            degenerate = report.degenerate,
            groups = report.groups_found,
            rejected_transforms = report.rejected_transforms,
            objects = report.batching.objects_created,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Extraction finished"
        );
        Ok(report)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
