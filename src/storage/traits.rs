// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The common contract implemented once per storage medium.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::document::Document;

/// Errors surfaced by storage backends.
///
/// Absence is **not** an error: `load` of a missing identifier returns
/// `Ok(None)`. Backends never swallow a medium failure; it propagates as
/// [`StorageError::Backend`] unmodified.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Stored (compressed) size exceeds the per-document cap.
    #[error("document too large: {size} bytes exceeds the {limit} byte limit")]
    CapacityExceeded { size: usize, limit: usize },

    /// The local medium is full (document count cap).
    #[error("document limit reached: {count} of {limit} documents stored")]
    DocumentLimit { count: usize, limit: usize },

    /// I/O or remote-call failure from the underlying medium.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// An authenticated session has no cloud backend wired in.
    #[error("cloud backend not configured for an authenticated session")]
    CloudUnavailable,
}

impl StorageError {
    /// Whether this error is a capacity condition the user can act on.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::DocumentLimit { .. }
        )
    }
}

/// Which physical medium a backend writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Cloud,
}

impl StorageKind {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document CRUD against one physical medium.
///
/// Implementations receive documents already in their on-medium form
/// (compressed content, fingerprint set) and return records exactly as
/// stored; the engine handles the plain/compressed translation.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persist a document.
    ///
    /// With an `id`, this updates that record. Without one, the medium's
    /// duplicate detection applies: an existing record with the same title
    /// and matching fingerprint is returned unchanged; a differing one is
    /// overwritten in place reusing its id; otherwise a fresh record is
    /// created and assigned an id.
    async fn save(&self, doc: Document) -> Result<Document, StorageError>;

    /// Look up by identifier: id takes precedence, then title.
    async fn load(&self, identifier: &str) -> Result<Option<Document>, StorageError>;

    /// All visible (non-deleted) documents, `updated_at` descending.
    /// Implementations may omit `content` for payload efficiency.
    async fn list(&self) -> Result<Vec<Document>, StorageError>;

    /// Remove a document by id or title. Deleting an absent identifier is
    /// `Ok(())` so retried deletes stay idempotent.
    async fn delete(&self, identifier: &str) -> Result<(), StorageError>;

    /// Which medium this backend writes to.
    fn kind(&self) -> StorageKind;
}
