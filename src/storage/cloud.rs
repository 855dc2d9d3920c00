// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cloud storage backend over a typed tabular client.
//!
//! The remote medium is modelled as a single documents table reached through
//! the [`DocumentTable`] capability trait (select/insert/update/delete with
//! typed rows and equality/ordering/limit predicates). Wiring a real remote
//! client (auth token plumbing included) is the embedding application's job;
//! this backend only speaks the trait.
//!
//! All queries are scoped to the owning identity. Deletion semantics are a
//! tagged choice ([`DeleteMode`]): soft delete flags the row and keeps it
//! recoverable, hard delete removes it. Either way, soft-deleted rows never
//! surface from `list` or title lookups.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StorageConfig;
use crate::document::{now_millis, Document};

use super::traits::{StorageBackend, StorageError, StorageKind};

/// How [`CloudBackend::delete`] disposes of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Flag the row (`is_deleted = true`); recoverable, excluded from listings.
    #[default]
    Soft,
    /// Remove the row from the table.
    Hard,
}

/// One row of the remote documents table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRow {
    /// Server-assigned identifier; empty on insert input.
    pub id: String,
    /// Owning identity.
    pub owner_id: String,
    pub title: String,
    /// Stored (compressed) body; `None` when the query omitted content.
    pub content: Option<String>,
    pub content_hash: Option<String>,
    pub tags: BTreeSet<String>,
    pub file_size: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
}

/// Typed predicate set for [`DocumentTable::select`].
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    /// Equality on `id`.
    pub id: Option<String>,
    /// Equality on `owner_id`.
    pub owner_id: Option<String>,
    /// Equality on `title`.
    pub title: Option<String>,
    /// Include soft-deleted rows (off by default).
    pub include_deleted: bool,
    /// Populate `content` in the returned rows.
    pub include_content: bool,
    /// Cap the number of returned rows.
    pub limit: Option<usize>,
}

impl RowFilter {
    /// Filter scoped to one owner, content omitted.
    #[must_use]
    pub fn for_owner(owner_id: &str) -> Self {
        Self {
            owner_id: Some(owner_id.to_string()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn with_content(mut self) -> Self {
        self.include_content = true;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The remote tabular client capability.
///
/// `select` returns rows ordered by `updated_at` descending. Implementations
/// must honor every predicate in [`RowFilter`]; the backend is statically
/// checked against this schema instead of issuing dynamic RPC calls.
#[async_trait]
pub trait DocumentTable: Send + Sync {
    async fn select(&self, filter: &RowFilter) -> Result<Vec<DocumentRow>, StorageError>;
    /// Insert a row, assigning its id. Returns the stored row.
    async fn insert(&self, row: DocumentRow) -> Result<DocumentRow, StorageError>;
    /// Replace the row with the given id. Returns the stored row.
    async fn update(&self, id: &str, row: DocumentRow) -> Result<DocumentRow, StorageError>;
    /// Remove the row with the given id.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// Document CRUD against the remote table, scoped to one owner.
pub struct CloudBackend {
    table: Arc<dyn DocumentTable>,
    owner_id: String,
    delete_mode: DeleteMode,
    max_document_bytes: usize,
}

impl CloudBackend {
    pub fn new(table: Arc<dyn DocumentTable>, owner_id: impl Into<String>, config: &StorageConfig) -> Self {
        Self {
            table,
            owner_id: owner_id.into(),
            delete_mode: DeleteMode::default(),
            max_document_bytes: config.max_document_bytes,
        }
    }

    /// Override the deletion semantics (default: [`DeleteMode::Soft`]).
    #[must_use]
    pub fn with_delete_mode(mut self, mode: DeleteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    fn row_from_doc(&self, doc: &Document) -> DocumentRow {
        DocumentRow {
            id: doc.id.clone().unwrap_or_default(),
            owner_id: self.owner_id.clone(),
            title: doc.title.clone(),
            content: Some(doc.content.clone()),
            content_hash: doc.content_hash.clone(),
            tags: doc.tags.clone(),
            file_size: doc.file_size,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            is_deleted: doc.is_deleted,
            deleted_at: doc.deleted_at,
        }
    }

    fn doc_from_row(row: DocumentRow) -> Document {
        Document {
            id: Some(row.id),
            title: row.title,
            content: row.content.unwrap_or_default(),
            tags: row.tags,
            file_size: row.file_size,
            created_at: row.created_at,
            updated_at: row.updated_at,
            content_hash: row.content_hash,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
        }
    }

    async fn find_by_id(&self, id: &str, with_content: bool) -> Result<Option<DocumentRow>, StorageError> {
        let mut filter = RowFilter::for_owner(&self.owner_id).with_id(id).with_limit(1);
        if with_content {
            filter = filter.with_content();
        }
        Ok(self.table.select(&filter).await?.into_iter().next())
    }

    async fn find_by_title(&self, title: &str, with_content: bool) -> Result<Option<DocumentRow>, StorageError> {
        let mut filter = RowFilter::for_owner(&self.owner_id)
            .with_title(title)
            .with_limit(1);
        if with_content {
            filter = filter.with_content();
        }
        Ok(self.table.select(&filter).await?.into_iter().next())
    }
}

#[async_trait]
impl StorageBackend for CloudBackend {
    async fn save(&self, mut doc: Document) -> Result<Document, StorageError> {
        let stored_size = doc.content.len();
        if stored_size > self.max_document_bytes {
            return Err(StorageError::CapacityExceeded {
                size: stored_size,
                limit: self.max_document_bytes,
            });
        }

        let existing = match doc.id.as_deref() {
            Some(id) => self.find_by_id(id, false).await?,
            // Duplicate detection scoped to (owner, title, not-deleted).
            None => self.find_by_title(&doc.title, false).await?,
        };

        match existing {
            Some(prev) => {
                if doc.content_hash.is_some()
                    && prev.content_hash == doc.content_hash
                    && prev.title == doc.title
                {
                    debug!(id = %prev.id, title = %prev.title, "cloud save skipped, content unchanged");
                    let full = self
                        .find_by_id(&prev.id, true)
                        .await?
                        .unwrap_or(prev);
                    return Ok(Self::doc_from_row(full));
                }

                doc.id = Some(prev.id.clone());
                doc.created_at = prev.created_at;
                doc.updated_at = now_millis();
                let row = self.table.update(&prev.id, self.row_from_doc(&doc)).await?;
                debug!(id = %row.id, bytes = stored_size, "cloud update");
                Ok(Self::doc_from_row(row))
            }
            None => match doc.id.as_deref() {
                // An id we cannot find is a medium-level anomaly, not a
                // create request: server-side ids only come from inserts.
                Some(id) => Err(StorageError::Backend(format!(
                    "update target '{id}' not found in cloud store"
                ))),
                None => {
                    doc.created_at = now_millis();
                    doc.updated_at = doc.created_at;
                    let row = self.table.insert(self.row_from_doc(&doc)).await?;
                    debug!(id = %row.id, bytes = stored_size, "cloud insert");
                    Ok(Self::doc_from_row(row))
                }
            },
        }
    }

    async fn load(&self, identifier: &str) -> Result<Option<Document>, StorageError> {
        if let Some(row) = self.find_by_id(identifier, true).await? {
            return Ok(Some(Self::doc_from_row(row)));
        }
        Ok(self
            .find_by_title(identifier, true)
            .await?
            .map(Self::doc_from_row))
    }

    async fn list(&self) -> Result<Vec<Document>, StorageError> {
        // Content omitted for payload efficiency; callers load individually.
        let rows = self.table.select(&RowFilter::for_owner(&self.owner_id)).await?;
        Ok(rows.into_iter().map(Self::doc_from_row).collect())
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        let target = match self.find_by_id(identifier, false).await? {
            Some(row) => Some(row),
            None => self.find_by_title(identifier, false).await?,
        };
        let Some(row) = target else {
            return Ok(());
        };

        match self.delete_mode {
            DeleteMode::Hard => {
                self.table.delete(&row.id).await?;
                debug!(id = %row.id, "cloud hard delete");
            }
            DeleteMode::Soft => {
                let mut tombstone = row.clone();
                tombstone.is_deleted = true;
                tombstone.deleted_at = Some(now_millis());
                tombstone.updated_at = now_millis();
                self.table.update(&row.id, tombstone).await?;
                debug!(id = %row.id, "cloud soft delete");
            }
        }
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Cloud
    }
}
