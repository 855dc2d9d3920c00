// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Hybrid storage engine.
//!
//! The [`HybridStorageEngine`] is the single entry point that hides which
//! medium a document lives on. The routing rule is fixed per session:
//!
//! - authenticated → every operation goes to the cloud backend; failures
//!   re-raise and are **never** retried against the local medium, so a write
//!   believed successful can never land in the wrong store
//! - not authenticated → every operation goes to the local backend
//!
//! Every outbound save is sealed (fingerprinted, compressed) and every
//! inbound result unsealed, so callers only ever see plain content.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scribe_store::{
//!     AuthSession, Document, HybridStorageEngine, LocalBackend, MemoryKv, StorageConfig,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = StorageConfig::default();
//! let local = Arc::new(LocalBackend::new(Arc::new(MemoryKv::new()), &config));
//! let engine =
//!     HybridStorageEngine::new(config, &AuthSession::anonymous(), local, None).unwrap();
//!
//! let saved = engine.save(Document::new("Notes", "hello")).await.unwrap();
//! assert!(saved.id.unwrap().starts_with("local_"));
//! # }
//! ```

mod export;
mod info;
mod types;

pub use export::{ExportBundle, ExportedDocument};
pub use types::{AuthSession, StorageInfo};

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::StorageConfig;
use crate::document::{now_millis, Document};
use crate::storage::cloud::CloudBackend;
use crate::storage::local::LocalBackend;
use crate::storage::traits::{StorageBackend, StorageError, StorageKind};

/// Single entry point routing document CRUD to exactly one backend per
/// identity session.
pub struct HybridStorageEngine {
    config: StorageConfig,
    is_authenticated: bool,
    local: Arc<LocalBackend>,
    cloud: Option<Arc<CloudBackend>>,
    /// Last successful cloud operation (epoch millis).
    last_sync: RwLock<Option<i64>>,
}

impl std::fmt::Debug for HybridStorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridStorageEngine")
            .field("config", &self.config)
            .field("is_authenticated", &self.is_authenticated)
            .field("has_cloud", &self.cloud.is_some())
            .field("last_sync", &*self.last_sync.read())
            .finish_non_exhaustive()
    }
}

impl HybridStorageEngine {
    /// Build an engine for one identity session.
    ///
    /// The authentication flag is derived from `session` once, here. An
    /// authenticated session without a cloud backend is refused: silently
    /// serving such a session from the local medium would violate the
    /// one-authoritative-copy rule.
    pub fn new(
        config: StorageConfig,
        session: &AuthSession,
        local: Arc<LocalBackend>,
        cloud: Option<Arc<CloudBackend>>,
    ) -> Result<Self, StorageError> {
        let is_authenticated = session.is_authenticated();
        if is_authenticated && cloud.is_none() {
            return Err(StorageError::CloudUnavailable);
        }
        debug!(authenticated = is_authenticated, "storage engine created");
        Ok(Self {
            config,
            is_authenticated,
            local,
            cloud,
            last_sync: RwLock::new(None),
        })
    }

    /// Whether this session routes to the cloud medium.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub(super) fn active(&self) -> Result<&dyn StorageBackend, StorageError> {
        if self.is_authenticated {
            match self.cloud.as_deref() {
                Some(cloud) => Ok(cloud),
                None => Err(StorageError::CloudUnavailable),
            }
        } else {
            Ok(self.local.as_ref())
        }
    }

    pub(super) fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub(super) fn last_sync(&self) -> Option<i64> {
        *self.last_sync.read()
    }

    fn mark_sync(&self, kind: StorageKind) {
        if kind == StorageKind::Cloud {
            *self.last_sync.write() = Some(now_millis());
        }
    }

    /// Persist a document on the active medium.
    ///
    /// Saving content identical (per fingerprint) to what is already stored
    /// under the same title is a no-op that returns the existing record.
    pub async fn save(&self, doc: Document) -> Result<Document, StorageError> {
        let backend = self.active()?;
        let kind = backend.kind();
        let started = Instant::now();

        let result = backend.save(doc.sealed()).await;
        crate::metrics::record_latency(kind.as_str(), "save", started.elapsed());
        match result {
            Ok(saved) => {
                crate::metrics::record_operation(kind.as_str(), "save", "success");
                self.mark_sync(kind);
                Ok(saved.unsealed())
            }
            Err(e) => {
                // Cloud failures re-raise; no silent local fallback.
                crate::metrics::record_operation(kind.as_str(), "save", "error");
                Err(e)
            }
        }
    }

    /// Look up a document by id or title. Absence is `Ok(None)`.
    pub async fn load(&self, identifier: &str) -> Result<Option<Document>, StorageError> {
        let backend = self.active()?;
        let kind = backend.kind();
        let doc = backend.load(identifier).await?;
        crate::metrics::record_operation(kind.as_str(), "load", "success");
        self.mark_sync(kind);
        Ok(doc.map(Document::unsealed))
    }

    /// All visible documents, newest first. Entries whose content the
    /// backend omitted come back with an empty body; use [`Self::load`]
    /// for the full record.
    pub async fn list(&self) -> Result<Vec<Document>, StorageError> {
        let backend = self.active()?;
        let kind = backend.kind();
        let docs = backend.list().await?;
        crate::metrics::record_operation(kind.as_str(), "list", "success");
        self.mark_sync(kind);
        Ok(docs.into_iter().map(Document::unsealed).collect())
    }

    /// Remove a document by id or title.
    pub async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        let backend = self.active()?;
        let kind = backend.kind();
        backend.delete(identifier).await?;
        crate::metrics::record_operation(kind.as_str(), "delete", "success");
        self.mark_sync(kind);
        Ok(())
    }
}
