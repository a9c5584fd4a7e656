// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{ObjectCategory, OutputItem};
use crate::error::SinkError;
use crate::flatten::LeafId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an object created by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj{}", self.0)
    }
}

/// Destination for emitted geometry.
///
/// One call creates one object from `items`. Calls are made from a single
/// thread and may fail for any reason; the engine treats the error as
/// opaque.
pub trait OutputSink {
    fn create_object(
        &mut self,
        category: ObjectCategory,
        items: &[OutputItem<'_>],
    ) -> Result<ObjectHandle, SinkError>;
}

/// Record of one object accepted by a [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedObject {
    pub handle: ObjectHandle,
    pub category: ObjectCategory,
    pub leaves: Vec<LeafId>,
    pub placeholders: usize,
}

/// Sink that keeps created objects in memory.
///
/// Optional limits make it reject oversized calls or whole categories.
#[derive(Debug, Default)]
pub struct MemorySink {
    objects: Vec<CreatedObject>,
    max_items: Option<usize>,
    rejected_categories: Vec<ObjectCategory>,
    calls: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject calls carrying more than `max_items` items
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Reject every call, or any item, of the given category
    pub fn rejecting(mut self, category: ObjectCategory) -> Self {
        self.rejected_categories.push(category);
        self
    }

    pub fn objects(&self) -> &[CreatedObject] {
        &self.objects
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Every leaf that ended up in some object, in creation order
    pub fn leaves(&self) -> Vec<LeafId> {
        self.objects.iter().flat_map(|o| o.leaves.iter().copied()).collect()
    }
}

impl OutputSink for MemorySink {
    fn create_object(
        &mut self,
        category: ObjectCategory,
        items: &[OutputItem<'_>],
    ) -> Result<ObjectHandle, SinkError> {
        self.calls += 1;

        if let Some(max) = self.max_items {
            if items.len() > max {
                return Err(SinkError::new(format!(
                    "{} items exceed limit of {}",
                    items.len(),
                    max
                )));
            }
        }
        let refused = std::iter::once(category)
            .chain(items.iter().map(|item| item.category()))
            .find(|c| self.rejected_categories.contains(c));
        if let Some(refused) = refused {
            return Err(SinkError::new(format!("{} objects are not accepted", refused.as_str())));
        }

        let handle = ObjectHandle(self.objects.len() as u64);
        self.objects.push(CreatedObject {
            handle,
            category,
            leaves: items.iter().map(|item| item.leaf).collect(),
            placeholders: items.iter().filter(|item| item.is_placeholder()).count(),
        });
        Ok(handle)
    }
}
