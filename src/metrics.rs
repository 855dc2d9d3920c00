// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for scribe-store.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `scribe_store_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_bytes` suffix for size histograms
//!
//! # Labels
//! - `backend`: local, cloud
//! - `operation`: save, load, list, delete
//! - `op`: queue item kind (save, delete, batch_save, batch_delete)
//! - `status`: success, error

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a storage backend operation outcome.
pub fn record_operation(backend: &str, operation: &str, status: &str) {
    counter!(
        "scribe_store_operations_total",
        "backend" => backend.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record storage operation latency.
pub fn record_latency(backend: &str, operation: &str, duration: Duration) {
    histogram!(
        "scribe_store_operation_seconds",
        "backend" => backend.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a compression outcome (plain vs stored sizes).
pub fn record_compression(original: usize, stored: usize) {
    histogram!("scribe_store_document_bytes").record(original as f64);
    if original > 0 {
        histogram!("scribe_store_compression_ratio").record(stored as f64 / original as f64);
    }
}

/// Set the number of items waiting in the sync queue.
pub fn set_queue_depth(depth: usize) {
    gauge!("scribe_store_queue_depth").set(depth as f64);
}

/// Set the number of in-flight sync operations.
pub fn set_queue_active(active: usize) {
    gauge!("scribe_store_queue_active").set(active as f64);
}

/// Record a dispatched queue item outcome.
pub fn record_queue_op(op: &str, status: &str) {
    counter!(
        "scribe_store_queue_ops_total",
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a queue item being scheduled for retry.
pub fn record_retry(op: &str) {
    counter!(
        "scribe_store_retries_total",
        "op" => op.to_string()
    )
    .increment(1);
}

/// Record a queue item dropped after exhausting its retries.
///
/// Enqueue is fire-and-forget, so this counter (plus the error log) is the
/// only visibility an embedding application gets into dropped background
/// writes.
pub fn record_retry_exhausted(op: &str) {
    counter!(
        "scribe_store_retry_exhausted_total",
        "op" => op.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // With no recorder installed these are no-ops; the tests pin the API.
    #[test]
    fn test_metrics_calls_do_not_panic() {
        record_operation("local", "save", "success");
        record_latency("cloud", "list", Duration::from_millis(5));
        record_compression(1000, 300);
        record_compression(0, 0);
        set_queue_depth(3);
        set_queue_active(1);
        record_queue_op("save", "error");
        record_retry("batch_save");
        record_retry_exhausted("delete");
    }
}
