// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hand-off of flattened leaves to an external object sink

mod batch;
mod item;
mod sink;

pub use batch::{BatchMode, BatchResult, Batcher, ParseBatchModeError};
pub use item::{ObjectCategory, OutputItem, OutputShape};
pub use sink::{CreatedObject, MemorySink, ObjectHandle, OutputSink};
