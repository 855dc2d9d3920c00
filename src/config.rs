//! Configuration for the storage engine and sync queue.
//!
//! # Example
//!
//! ```
//! use scribe_store::StorageConfig;
//!
//! // Minimal config (uses defaults)
//! let config = StorageConfig::default();
//! assert_eq!(config.sync_concurrency, 2);
//!
//! // Full config
//! let config = StorageConfig {
//!     max_document_bytes: 512 * 1024,
//!     sync_batch_chunk_size: 5,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the storage engine and sync queue.
///
/// All fields have sensible defaults tuned for a single-user document
/// editor backed by a browser-grade key-value store and a rate-limited
/// remote table.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Per-document size cap in bytes, measured on the *stored* (compressed)
    /// form. Shared by the local and cloud media.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Maximum number of documents the local medium will hold.
    #[serde(default = "default_local_max_documents")]
    pub local_max_documents: usize,

    /// Advisory local quota in bytes, reported via storage info.
    #[serde(default = "default_local_quota_bytes")]
    pub local_quota_bytes: u64,

    /// Maximum overlapping backend operations the sync queue dispatches.
    /// Kept small to respect tight remote rate limits.
    #[serde(default = "default_sync_concurrency")]
    pub sync_concurrency: usize,

    /// Retries per queue item before it is dropped.
    #[serde(default = "default_sync_max_retries")]
    pub sync_max_retries: u32,

    /// Fixed delay before a failed queue item becomes dispatchable again.
    #[serde(default = "default_sync_retry_backoff_ms")]
    pub sync_retry_backoff_ms: u64,

    /// Batch enqueue operations are split into chunks of this many documents
    /// so no single queue item starves higher-priority work.
    #[serde(default = "default_sync_batch_chunk_size")]
    pub sync_batch_chunk_size: usize,
}

fn default_max_document_bytes() -> usize { 2 * 1024 * 1024 } // 2 MB
fn default_local_max_documents() -> usize { 200 }
fn default_local_quota_bytes() -> u64 { 5 * 1024 * 1024 } // 5 MB
fn default_sync_concurrency() -> usize { 2 }
fn default_sync_max_retries() -> u32 { 3 }
fn default_sync_retry_backoff_ms() -> u64 { 1000 }
fn default_sync_batch_chunk_size() -> usize { 10 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
            local_max_documents: default_local_max_documents(),
            local_quota_bytes: default_local_quota_bytes(),
            sync_concurrency: default_sync_concurrency(),
            sync_max_retries: default_sync_max_retries(),
            sync_retry_backoff_ms: default_sync_retry_backoff_ms(),
            sync_batch_chunk_size: default_sync_batch_chunk_size(),
        }
    }
}
