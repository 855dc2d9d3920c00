// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The queue's single-consumer drain loop.
//!
//! One task owns all queue mutation: it pops the best ready item whenever an
//! in-flight slot is free, dispatches it on a spawned task, and parks on a
//! [`tokio::sync::Notify`] (or sleeps until the earliest retry becomes
//! eligible) when there is nothing to do. Completions re-notify the loop, so
//! progress is continuous without busy-waiting.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::document::now_millis;
use crate::storage::traits::StorageError;

use super::item::QueueItem;
use super::QueueInner;

pub(super) async fn run(inner: Arc<QueueInner>) {
    info!(concurrency = inner.concurrency, "sync queue worker started");

    loop {
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }

        // Fill free slots with ready work.
        while !inner.paused.load(Ordering::Acquire)
            && inner.active.load(Ordering::Acquire) < inner.concurrency
        {
            let Some(item) = pop_ready(&inner) else {
                break;
            };
            inner.active.fetch_add(1, Ordering::AcqRel);
            crate::metrics::set_queue_active(inner.active.load(Ordering::Acquire));

            let worker = inner.clone();
            tokio::spawn(async move {
                dispatch(worker, item).await;
            });
        }

        // Park until something changes, or until the earliest deferred item
        // becomes eligible.
        match next_wakeup(&inner) {
            Some(delay) => {
                tokio::select! {
                    _ = inner.notify.notified() => {}
                    _ = sleep(delay) => {}
                }
            }
            None => inner.notify.notified().await,
        }
    }

    info!("sync queue worker stopped");
}

/// Pop the dispatchable item with the best (priority, timestamp, insertion)
/// key, if any.
fn pop_ready(inner: &QueueInner) -> Option<QueueItem> {
    let mut pending = inner.pending.lock();
    let now = now_millis();
    let idx = pending
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_ready(now))
        .min_by_key(|(_, item)| item.dispatch_key())
        .map(|(idx, _)| idx)?;
    let item = pending.remove(idx);
    crate::metrics::set_queue_depth(pending.len());
    Some(item)
}

/// How long until the earliest pending item becomes dispatchable, when the
/// loop could actually dispatch it. `None` means: nothing schedulable, park
/// until notified.
fn next_wakeup(inner: &QueueInner) -> Option<Duration> {
    if inner.paused.load(Ordering::Acquire)
        || inner.active.load(Ordering::Acquire) >= inner.concurrency
    {
        return None;
    }
    let pending = inner.pending.lock();
    let earliest = pending.iter().map(|item| item.timestamp).min()?;
    let wait_ms = (earliest - now_millis()).max(0) as u64;
    Some(Duration::from_millis(wait_ms))
}

async fn dispatch(inner: Arc<QueueInner>, mut item: QueueItem) {
    let kind = item.op.kind();
    debug!(id = item.id, op = kind, priority = %item.priority, "dispatching sync item");

    match execute(&inner, &item).await {
        Ok(()) => {
            debug!(id = item.id, op = kind, "sync item completed");
            crate::metrics::record_queue_op(kind, "success");
        }
        Err(e) if item.retries < item.max_retries => {
            item.retries += 1;
            item.timestamp = now_millis() + inner.backoff_ms as i64;
            warn!(
                id = item.id,
                op = kind,
                retries = item.retries,
                max_retries = item.max_retries,
                error = %e,
                "sync item failed, scheduling retry"
            );
            crate::metrics::record_retry(kind);

            let mut pending = inner.pending.lock();
            pending.push(item);
            crate::metrics::set_queue_depth(pending.len());
        }
        Err(e) => {
            // Enqueue is fire-and-forget: the log and counter are the only
            // failure signal the caller ever gets.
            error!(
                id = item.id,
                op = kind,
                retries = item.retries,
                error = %e,
                "sync item dropped after exhausting retries"
            );
            crate::metrics::record_queue_op(kind, "error");
            crate::metrics::record_retry_exhausted(kind);
        }
    }

    inner.active.fetch_sub(1, Ordering::AcqRel);
    crate::metrics::set_queue_active(inner.active.load(Ordering::Acquire));
    inner.notify.notify_one();
}

/// Drive the backend for one item. Batch items run their members in order
/// and fail as a unit; backend saves are idempotent, so a retried chunk may
/// safely replay already-written members.
async fn execute(inner: &QueueInner, item: &QueueItem) -> Result<(), StorageError> {
    use super::item::QueueOp;

    match &item.op {
        QueueOp::Save(doc) => {
            inner.backend.save(doc.clone().sealed()).await?;
            Ok(())
        }
        QueueOp::Delete(id) => inner.backend.delete(id).await,
        QueueOp::BatchSave(docs) => {
            for doc in docs {
                inner.backend.save(doc.clone().sealed()).await?;
            }
            Ok(())
        }
        QueueOp::BatchDelete(ids) => {
            for id in ids {
                inner.backend.delete(id).await?;
            }
            Ok(())
        }
    }
}
