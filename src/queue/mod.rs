// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Background sync queue.
//!
//! The [`SyncQueue`] decouples slow cloud writes from interactive
//! operations. Enqueue is synchronous, non-blocking and fire-and-forget: it
//! appends to an in-memory list and nudges the drain task; it never performs
//! I/O itself. The drain task dispatches items strictly by priority (FIFO
//! within a tier), keeps at most a configured number of operations in
//! flight, and retries failures with a fixed backoff before dropping them.
//!
//! Queued work lives only in process memory; a crash loses whatever had not
//! been flushed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scribe_store::{
//!     Document, LocalBackend, MemoryKv, Priority, StorageConfig, SyncQueue,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = StorageConfig::default();
//! let backend = Arc::new(LocalBackend::new(Arc::new(MemoryKv::new()), &config));
//! let queue = SyncQueue::spawn(backend, &config);
//!
//! queue.enqueue_save(Document::new("Notes", "hello"), Priority::High);
//! assert!(queue.status().queue_length <= 1); // may already be in flight
//! # queue.shutdown();
//! # }
//! ```

mod drain;
mod item;

pub use item::{Priority, QueueOp};

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::config::StorageConfig;
use crate::document::{now_millis, Document};
use crate::storage::traits::StorageBackend;

use item::{chunked, QueueItem};

/// Pending/in-flight counts per priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Observability snapshot of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Items waiting (ready or backing off), not counting in-flight ones.
    pub queue_length: usize,
    /// Operations currently dispatched and unresolved.
    pub active_operations: usize,
    /// Pending items per priority tier.
    pub priority_breakdown: PriorityBreakdown,
}

/// State shared between the queue handle, the drain loop and dispatch tasks.
pub(super) struct QueueInner {
    pub(super) backend: Arc<dyn StorageBackend>,
    pub(super) pending: Mutex<Vec<QueueItem>>,
    pub(super) active: AtomicUsize,
    pub(super) paused: AtomicBool,
    pub(super) shutdown: AtomicBool,
    pub(super) notify: Notify,
    next_id: AtomicU64,
    pub(super) concurrency: usize,
    max_retries: u32,
    pub(super) backoff_ms: u64,
    chunk_size: usize,
}

/// Handle to the background sync queue. Cheap to clone.
#[derive(Clone)]
pub struct SyncQueue {
    inner: Arc<QueueInner>,
}

impl SyncQueue {
    /// Create the queue and spawn its drain task on the current runtime.
    #[must_use]
    pub fn spawn(backend: Arc<dyn StorageBackend>, config: &StorageConfig) -> Self {
        let inner = Arc::new(QueueInner {
            backend,
            pending: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            notify: Notify::new(),
            next_id: AtomicU64::new(0),
            concurrency: config.sync_concurrency.max(1),
            max_retries: config.sync_max_retries,
            backoff_ms: config.sync_retry_backoff_ms,
            chunk_size: config.sync_batch_chunk_size,
        });
        tokio::spawn(drain::run(inner.clone()));
        Self { inner }
    }

    fn push(&self, op: QueueOp, priority: Priority) {
        let item = QueueItem {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            op,
            priority,
            timestamp: now_millis(),
            retries: 0,
            max_retries: self.inner.max_retries,
        };
        debug!(id = item.id, op = item.op.kind(), priority = %priority, "enqueued sync item");

        let mut pending = self.inner.pending.lock();
        pending.push(item);
        crate::metrics::set_queue_depth(pending.len());
        drop(pending);

        self.inner.notify.notify_one();
    }

    /// Defer a single save. Fire-and-forget.
    pub fn enqueue_save(&self, doc: Document, priority: Priority) {
        self.push(QueueOp::Save(doc), priority);
    }

    /// Defer a single delete. Fire-and-forget.
    pub fn enqueue_delete(&self, id: impl Into<String>, priority: Priority) {
        self.push(QueueOp::Delete(id.into()), priority);
    }

    /// Defer a batch of saves, split into bounded chunks so large batches
    /// cannot starve higher-priority items.
    pub fn enqueue_batch_save(&self, docs: Vec<Document>, priority: Priority) {
        for chunk in chunked(docs, self.inner.chunk_size) {
            self.push(QueueOp::BatchSave(chunk), priority);
        }
    }

    /// Defer a batch of deletes, split into bounded chunks.
    pub fn enqueue_batch_delete(&self, ids: Vec<String>, priority: Priority) {
        for chunk in chunked(ids, self.inner.chunk_size) {
            self.push(QueueOp::BatchDelete(chunk), priority);
        }
    }

    /// Suspend dispatching. Items keep accumulating; in-flight operations
    /// already dispatched are unaffected.
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Release);
        debug!("sync queue paused");
    }

    /// Resume dispatching.
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Release);
        self.inner.notify.notify_one();
        debug!("sync queue resumed");
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Acquire)
    }

    /// Drop all pending items without attempting them. Returns how many
    /// were dropped. In-flight operations are not cancelled.
    pub fn clear(&self) -> usize {
        let mut pending = self.inner.pending.lock();
        let dropped = pending.len();
        pending.clear();
        crate::metrics::set_queue_depth(0);
        debug!(dropped, "sync queue cleared");
        dropped
    }

    /// Current queue snapshot.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let pending = self.inner.pending.lock();
        let mut breakdown = PriorityBreakdown::default();
        for item in pending.iter() {
            match item.priority {
                Priority::High => breakdown.high += 1,
                Priority::Medium => breakdown.medium += 1,
                Priority::Low => breakdown.low += 1,
            }
        }
        QueueStatus {
            queue_length: pending.len(),
            active_operations: self.inner.active.load(Ordering::Acquire),
            priority_breakdown: breakdown,
        }
    }

    /// Stop the drain task. Pending items are abandoned; in-flight
    /// operations run to completion.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex as PlMutex;
    use std::time::Duration;

    use crate::storage::traits::{StorageError, StorageKind};

    /// Records operations and fails the first `fail_times` calls.
    struct ScriptedBackend {
        calls: PlMutex<Vec<String>>,
        fail_times: AtomicUsize,
        delay_ms: u64,
    }

    impl ScriptedBackend {
        fn new() -> Arc<Self> {
            Self::failing(0)
        }

        fn failing(times: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: PlMutex::new(Vec::new()),
                fail_times: AtomicUsize::new(times),
                delay_ms: 0,
            })
        }

        fn slow(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                calls: PlMutex::new(Vec::new()),
                fail_times: AtomicUsize::new(0),
                delay_ms,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        async fn record(&self, call: String) -> Result<(), StorageError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.calls.lock().push(call);
            let remaining = self.fail_times.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(StorageError::Backend("scripted failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StorageBackend for ScriptedBackend {
        async fn save(&self, doc: Document) -> Result<Document, StorageError> {
            self.record(format!("save:{}", doc.title)).await?;
            Ok(doc)
        }

        async fn load(&self, _identifier: &str) -> Result<Option<Document>, StorageError> {
            Ok(None)
        }

        async fn list(&self) -> Result<Vec<Document>, StorageError> {
            Ok(Vec::new())
        }

        async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
            self.record(format!("delete:{identifier}")).await
        }

        fn kind(&self) -> StorageKind {
            StorageKind::Cloud
        }
    }

    fn fast_config() -> StorageConfig {
        StorageConfig {
            sync_concurrency: 1,
            sync_retry_backoff_ms: 20,
            sync_batch_chunk_size: 5,
            ..Default::default()
        }
    }

    async fn settle(queue: &SyncQueue) {
        for _ in 0..200 {
            let status = queue.status();
            if status.queue_length == 0 && status.active_operations == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue did not settle: {:?}", queue.status());
    }

    #[tokio::test]
    async fn test_enqueue_and_drain_single_save() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.enqueue_save(Document::new("n", "c"), Priority::Medium);
        settle(&queue).await;

        assert_eq!(backend.calls(), vec!["save:n"]);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_priority_order_with_fifo_within_tier() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        // Hold dispatch so all three are pending before draining starts.
        queue.pause();
        queue.enqueue_save(Document::new("low-first", "c"), Priority::Low);
        queue.enqueue_save(Document::new("high-first", "c"), Priority::High);
        queue.enqueue_save(Document::new("high-second", "c"), Priority::High);
        queue.resume();
        settle(&queue).await;

        assert_eq!(
            backend.calls(),
            vec!["save:high-first", "save:high-second", "save:low-first"]
        );
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let backend = ScriptedBackend::failing(2);
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.enqueue_delete("doc-1", Priority::High);
        settle(&queue).await;

        // Two failures plus the final success.
        assert_eq!(backend.calls().len(), 3);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_retry_exhaustion_drops_item() {
        let backend = ScriptedBackend::failing(usize::MAX);
        let config = StorageConfig {
            sync_max_retries: 3,
            ..fast_config()
        };
        let queue = SyncQueue::spawn(backend.clone(), &config);

        queue.enqueue_delete("doomed", Priority::High);
        settle(&queue).await;

        // Initial attempt + exactly max_retries retries, then dropped.
        assert_eq!(backend.calls().len(), 4);
        let status = queue.status();
        assert_eq!(status.queue_length, 0);
        assert_eq!(status.active_operations, 0);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_retry_waits_for_backoff() {
        let backend = ScriptedBackend::failing(1);
        let config = StorageConfig {
            sync_retry_backoff_ms: 80,
            ..fast_config()
        };
        let queue = SyncQueue::spawn(backend.clone(), &config);

        let started = std::time::Instant::now();
        queue.enqueue_delete("slowpoke", Priority::High);
        settle(&queue).await;

        assert_eq!(backend.calls().len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(80));
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_fresh_work_preempts_backing_off_item() {
        let backend = ScriptedBackend::failing(1);
        let config = StorageConfig {
            sync_retry_backoff_ms: 60,
            ..fast_config()
        };
        let queue = SyncQueue::spawn(backend.clone(), &config);

        // First delete fails once and backs off...
        queue.enqueue_delete("retrying", Priority::High);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // ...so this one dispatches before the retry becomes eligible.
        queue.enqueue_delete("fresh", Priority::High);
        settle(&queue).await;

        assert_eq!(
            backend.calls(),
            vec!["delete:retrying", "delete:fresh", "delete:retrying"]
        );
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_batch_save_chunking() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.pause();
        let docs: Vec<Document> = (0..11)
            .map(|i| Document::new(format!("d{i}"), "c"))
            .collect();
        queue.enqueue_batch_save(docs, Priority::Medium);

        let status = queue.status();
        assert_eq!(status.queue_length, 3); // 5 + 5 + 1
        assert_eq!(status.priority_breakdown.medium, 3);

        queue.resume();
        settle(&queue).await;
        assert_eq!(backend.calls().len(), 11);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_batch_delete_chunking() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.pause();
        queue.enqueue_batch_delete((0..6).map(|i| format!("id{i}")).collect(), Priority::Low);
        assert_eq!(queue.status().queue_length, 2); // 5 + 1

        queue.resume();
        settle(&queue).await;
        assert_eq!(backend.calls().len(), 6);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_pause_holds_items_resume_drains() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.pause();
        queue.enqueue_delete("held", Priority::High);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.calls().is_empty());
        assert_eq!(queue.status().queue_length, 1);

        queue.resume();
        settle(&queue).await;
        assert_eq!(backend.calls(), vec!["delete:held"]);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_clear_drops_pending() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.pause();
        queue.enqueue_delete("a", Priority::Low);
        queue.enqueue_delete("b", Priority::Low);
        assert_eq!(queue.clear(), 2);

        queue.resume();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(backend.calls().is_empty());
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let backend = ScriptedBackend::slow(40);
        let config = StorageConfig {
            sync_concurrency: 2,
            ..fast_config()
        };
        let queue = SyncQueue::spawn(backend.clone(), &config);

        for i in 0..4 {
            queue.enqueue_delete(format!("id{i}"), Priority::Medium);
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(queue.status().active_operations <= 2);

        settle(&queue).await;
        assert_eq!(backend.calls().len(), 4);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_failure_isolated_per_item() {
        // First item always fails; its sibling must still complete.
        let backend = ScriptedBackend::failing(1);
        let queue = SyncQueue::spawn(backend.clone(), &fast_config());

        queue.pause();
        queue.enqueue_delete("flaky", Priority::High);
        queue.enqueue_delete("steady", Priority::Low);
        queue.resume();
        settle(&queue).await;

        let calls = backend.calls();
        assert!(calls.contains(&"delete:steady".to_string()));
        assert_eq!(calls.iter().filter(|c| *c == "delete:flaky").count(), 2);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_status_breakdown() {
        let backend = ScriptedBackend::new();
        let queue = SyncQueue::spawn(backend, &fast_config());

        queue.pause();
        queue.enqueue_delete("a", Priority::High);
        queue.enqueue_delete("b", Priority::Medium);
        queue.enqueue_delete("c", Priority::Medium);
        queue.enqueue_delete("d", Priority::Low);

        let status = queue.status();
        assert_eq!(status.queue_length, 4);
        assert_eq!(status.priority_breakdown.high, 1);
        assert_eq!(status.priority_breakdown.medium, 2);
        assert_eq!(status.priority_breakdown.low, 1);
        queue.shutdown();
    }
}
