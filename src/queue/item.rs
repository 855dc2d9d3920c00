// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Queue item types and batch chunking.

use crate::document::Document;

/// Dispatch priority. Higher priorities strictly dominate; within a tier,
/// earlier timestamps dispatch first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A deferred backend operation. Documents are held in plain form and
/// sealed at dispatch time.
#[derive(Debug, Clone)]
pub enum QueueOp {
    Save(Document),
    Delete(String),
    BatchSave(Vec<Document>),
    BatchDelete(Vec<String>),
}

impl QueueOp {
    /// Label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::Delete(_) => "delete",
            Self::BatchSave(_) => "batch_save",
            Self::BatchDelete(_) => "batch_delete",
        }
    }
}

/// One pending queue entry.
#[derive(Debug, Clone)]
pub(super) struct QueueItem {
    /// Monotonic insertion counter; final tie-break for identical
    /// timestamps within a priority tier.
    pub id: u64,
    pub op: QueueOp,
    pub priority: Priority,
    /// Insertion time, pushed into the future by the backoff delay on
    /// retry; the item is not dispatchable before it.
    pub timestamp: i64,
    pub retries: u32,
    pub max_retries: u32,
}

impl QueueItem {
    pub fn is_ready(&self, now: i64) -> bool {
        self.timestamp <= now
    }

    /// Sort key: highest priority first, then earliest timestamp, then
    /// insertion order.
    pub fn dispatch_key(&self) -> (std::cmp::Reverse<Priority>, i64, u64) {
        (std::cmp::Reverse(self.priority), self.timestamp, self.id)
    }
}

/// Split a batch into bounded chunks so no single queue item is
/// disproportionately large. A zero size is treated as one.
pub(super) fn chunked<T>(items: Vec<T>, chunk_size: usize) -> Vec<Vec<T>> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(chunk_size));
    let mut current = Vec::with_capacity(chunk_size.min(items.len()));
    for item in items {
        current.push(item);
        if current.len() == chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
