// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batched emission with bisection on sink rejection

use super::{ObjectCategory, ObjectHandle, OutputItem, OutputSink};
use crate::cancel::CancellationToken;
use crate::fallback::{FallbackCascade, FallbackTier, TierTally};
use crate::flatten::LeafId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// How leaves are bundled into sink calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BatchMode {
    /// One sink call per leaf
    #[default]
    PerLeaf,
    /// Up to `n` leaves per sink call
    FixedSize(NonZeroUsize),
    /// Every leaf in a single sink call
    SingleAggregate,
}

impl BatchMode {
    /// Items per sink call for a run of `total` leaves
    fn chunk_size(&self, total: usize) -> usize {
        match self {
            BatchMode::PerLeaf => 1,
            BatchMode::FixedSize(n) => n.get(),
            BatchMode::SingleAggregate => total.max(1),
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::PerLeaf => write!(f, "per-leaf"),
            BatchMode::FixedSize(n) => write!(f, "fixed:{}", n),
            BatchMode::SingleAggregate => write!(f, "single"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid batch mode '{0}', expected per-leaf, single or fixed:<n>")]
pub struct ParseBatchModeError(pub String);

impl FromStr for BatchMode {
    type Err = ParseBatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        match text.as_str() {
            "per-leaf" | "perleaf" => Ok(BatchMode::PerLeaf),
            "single" | "aggregate" => Ok(BatchMode::SingleAggregate),
            _ => text
                .strip_prefix("fixed:")
                .and_then(|n| n.trim().parse::<usize>().ok())
                .and_then(NonZeroUsize::new)
                .map(BatchMode::FixedSize)
                .ok_or_else(|| ParseBatchModeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for BatchMode {
    type Error = ParseBatchModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BatchMode> for String {
    fn from(mode: BatchMode) -> Self {
        mode.to_string()
    }
}

/// Outcome of emitting one run of items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub handles: Vec<ObjectHandle>,
    pub sink_calls: usize,
    pub rejected_calls: usize,
    pub bisections: usize,
    /// Cascade outcomes for items the sink refused
    pub recovered: TierTally,
    /// Leaves whose every representation was refused
    pub dropped: Vec<LeafId>,
}

/// Groups items into sink calls according to a [`BatchMode`].
///
/// A refused batch is split in half until single items remain; a refused
/// single item is re-represented through the fallback cascade.
pub struct Batcher {
    mode: BatchMode,
    cascade: FallbackCascade,
    cancel: Option<CancellationToken>,
}

impl Batcher {
    pub fn new(mode: BatchMode, cascade: FallbackCascade) -> Self {
        Self {
            mode,
            cascade,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    pub fn emit(&self, items: &[OutputItem<'_>], sink: &mut dyn OutputSink) -> BatchResult {
        let mut result = BatchResult::default();
        if items.is_empty() {
            return result;
        }

        let size = self.mode.chunk_size(items.len());
        let mut start = 0;
        while start < items.len() {
            if self.cancelled() {
                debug!(remaining = items.len() - start, "Emission cancelled");
                break;
            }
            let end = (start + size).min(items.len());
            self.emit_batch(items, start..end, sink, &mut result);
            start = end;
        }
        result
    }

    fn emit_batch(
        &self,
        items: &[OutputItem<'_>],
        batch: Range<usize>,
        sink: &mut dyn OutputSink,
        result: &mut BatchResult,
    ) {
        let mut pending = vec![batch];
        while let Some(range) = pending.pop() {
            let slice = &items[range.clone()];
            let category = match slice {
                [single] => single.category(),
                _ => ObjectCategory::Compound,
            };

            result.sink_calls += 1;
            match sink.create_object(category, slice) {
                Ok(handle) => result.handles.push(handle),
                Err(err) => {
                    result.rejected_calls += 1;
                    warn!(items = slice.len(), category = category.as_str(), %err, "Sink rejected batch");
                    if slice.len() > 1 {
                        result.bisections += 1;
                        let mid = range.start + slice.len() / 2;
                        pending.push(mid..range.end);
                        pending.push(range.start..mid);
                    } else {
                        self.recover_rejected(&slice[0], sink, result);
                    }
                }
            }
        }
    }

    /// Offer lower-fidelity representations of a refused item until the
    /// sink accepts one or the cascade runs out
    fn recover_rejected(&self, item: &OutputItem<'_>, sink: &mut dyn OutputSink, result: &mut BatchResult) {
        let mut start = match item.tier {
            None => Some(FallbackTier::Edges),
            Some(tier) => tier.next(),
        };

        loop {
            let recovery = match self
                .cascade
                .recover_from(item.leaf, item.payload, start, &mut result.recovered)
            {
                Ok(recovery) => recovery,
                Err(err) => {
                    warn!(leaf = %item.leaf, %err, "Dropping leaf");
                    result.dropped.push(item.leaf);
                    return;
                }
            };

            let tier = recovery.tier;
            let replacement = item.with_recovery(recovery);
            let category = replacement.category();
            result.sink_calls += 1;
            match sink.create_object(category, std::slice::from_ref(&replacement)) {
                Ok(handle) => {
                    result.handles.push(handle);
                    return;
                }
                Err(err) => {
                    result.rejected_calls += 1;
                    warn!(leaf = %item.leaf, tier = tier.as_str(), %err, "Sink rejected recovered leaf");
                    start = tier.next();
                }
            }
        }
    }
}
