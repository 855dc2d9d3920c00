//! # Scribe Store
//!
//! A hybrid local/cloud storage engine for a personal document editor, with
//! a background sync queue for deferred cloud work.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HybridStorageEngine                      │
//! │  • Routes to exactly one backend per identity session      │
//! │  • Compresses outbound / decompresses inbound content      │
//! │  • Fingerprint dedupe of redundant saves                   │
//! │  • Storage info snapshots + full-library export            │
//! └─────────────────────────────────────────────────────────────┘
//!            │ signed out                   │ signed in
//!            ▼                              ▼
//! ┌──────────────────────┐      ┌──────────────────────────────┐
//! │     LocalBackend     │      │         CloudBackend         │
//! │  • String key-value  │      │  • Typed documents table     │
//! │    medium            │      │  • Owner-scoped queries      │
//! │  • Hard deletes      │      │  • Soft/hard delete modes    │
//! └──────────────────────┘      └──────────────────────────────┘
//!                                        ▲
//!                                        │ deferred saves/deletes
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SyncQueue                            │
//! │  • Priority-ordered, FIFO within a tier                    │
//! │  • Bounded concurrency, fixed-backoff retries              │
//! │  • Batches split into bounded chunks                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use scribe_store::{
//!     AuthSession, Document, HybridStorageEngine, LocalBackend, MemoryKv, StorageConfig,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = StorageConfig::default();
//!     let local = Arc::new(LocalBackend::new(Arc::new(MemoryKv::new()), &config));
//!     let engine = HybridStorageEngine::new(config, &AuthSession::anonymous(), local, None)
//!         .expect("local sessions need no cloud backend");
//!
//!     let saved = engine
//!         .save(Document::new("Notes", "hello"))
//!         .await
//!         .expect("save failed");
//!     assert!(saved.id.unwrap().starts_with("local_"));
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **One authoritative copy**: authenticated sessions write only to the
//!   cloud backend; failures re-raise instead of falling back locally
//! - **Idempotent saves**: unchanged content (per fingerprint) is a no-op
//!   returning the stored record
//! - **Plain content everywhere**: compression exists only on the medium
//! - **Stable ids**: an id never changes across subsequent saves
//! - **Bounded background work**: the sync queue dispatches by priority with
//!   a small concurrency cap and drops items only after exhausting retries
//!
//! ## Modules
//!
//! - [`engine`]: the [`HybridStorageEngine`] entry point
//! - [`storage`]: backend trait plus local/cloud/in-memory implementations
//! - [`queue`]: the background [`SyncQueue`]
//! - [`codec`]: transparent content compression
//! - [`fingerprint`]: cheap content-identity sketch
//! - [`config`]: [`StorageConfig`]
//! - [`metrics`]: instrumentation helpers

pub mod codec;
pub mod config;
pub mod document;
pub mod engine;
pub mod fingerprint;
pub mod metrics;
pub mod queue;
pub mod storage;

pub use config::StorageConfig;
pub use document::Document;
pub use engine::{AuthSession, ExportBundle, ExportedDocument, HybridStorageEngine, StorageInfo};
pub use queue::{Priority, PriorityBreakdown, QueueStatus, SyncQueue};
pub use storage::cloud::{CloudBackend, DeleteMode, DocumentRow, DocumentTable, RowFilter};
pub use storage::local::{KeyValueStore, LocalBackend};
pub use storage::memory::{MemoryKv, MemoryTable};
pub use storage::traits::{StorageBackend, StorageError, StorageKind};
