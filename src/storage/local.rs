// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Local storage backend over a string key-value primitive.
//!
//! The medium is anything that can store JSON strings under string keys
//! (browser local storage, a preferences file, [`crate::storage::memory::MemoryKv`]).
//! Each document is one JSON record under `doc:<id>`; listing scans the
//! prefix. Deletes here are hard deletes: the key is removed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::StorageConfig;
use crate::document::{generate_local_id, now_millis, Document};

use super::traits::{StorageBackend, StorageError, StorageKind};

/// Key prefix for document records on the key-value medium.
const DOC_KEY_PREFIX: &str = "doc:";

/// The key-value persistence primitive the local medium runs on.
///
/// Synchronous by design: the collaborating stores (browser local storage
/// and friends) are synchronous, and keeping the trait sync lets the engine
/// take cheap storage-info snapshots without awaiting.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
    /// All keys currently present, in no particular order.
    fn keys(&self) -> Vec<String>;
}

/// Document CRUD over a [`KeyValueStore`].
pub struct LocalBackend {
    kv: Arc<dyn KeyValueStore>,
    max_document_bytes: usize,
    max_documents: usize,
}

impl LocalBackend {
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            kv,
            max_document_bytes: config.max_document_bytes,
            max_documents: config.local_max_documents,
        }
    }

    fn key_for(id: &str) -> String {
        format!("{DOC_KEY_PREFIX}{id}")
    }

    fn read(&self, id: &str) -> Result<Option<Document>, StorageError> {
        match self.kv.get(&Self::key_for(id)) {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Backend(format!("corrupt record for '{id}': {e}"))),
            None => Ok(None),
        }
    }

    fn write(&self, doc: &Document) -> Result<(), StorageError> {
        let id = doc
            .id
            .as_deref()
            .ok_or_else(|| StorageError::Backend("cannot store a document without an id".into()))?;
        let raw = serde_json::to_string(doc)
            .map_err(|e| StorageError::Backend(format!("failed to encode record: {e}")))?;
        self.kv.set(&Self::key_for(id), &raw)
    }

    fn read_all(&self) -> Result<Vec<Document>, StorageError> {
        let mut docs = Vec::new();
        for key in self.kv.keys() {
            let Some(id) = key.strip_prefix(DOC_KEY_PREFIX) else {
                continue;
            };
            if let Some(doc) = self.read(id)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn find_by_title(&self, title: &str) -> Result<Option<Document>, StorageError> {
        let mut best: Option<Document> = None;
        for doc in self.read_all()? {
            if doc.title == title && !doc.is_deleted {
                match &best {
                    Some(b) if b.updated_at >= doc.updated_at => {}
                    _ => best = Some(doc),
                }
            }
        }
        Ok(best)
    }

    /// Number of documents currently stored. Synchronous, used for the
    /// cheap storage-info snapshot.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.kv
            .keys()
            .iter()
            .filter(|k| k.starts_with(DOC_KEY_PREFIX))
            .count()
    }

    /// Sum of the stored documents' uncompressed sizes. Synchronous.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.read_all()
            .map(|docs| docs.iter().map(|d| d.file_size).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn save(&self, mut doc: Document) -> Result<Document, StorageError> {
        let stored_size = doc.content.len();
        if stored_size > self.max_document_bytes {
            return Err(StorageError::CapacityExceeded {
                size: stored_size,
                limit: self.max_document_bytes,
            });
        }

        let existing = match doc.id.as_deref() {
            Some(id) => self.read(id)?,
            None => self.find_by_title(&doc.title)?,
        };

        match existing {
            Some(prev) => {
                // Unchanged content: no-op, hand back the stored record.
                if doc.content_hash.is_some()
                    && prev.content_hash == doc.content_hash
                    && prev.title == doc.title
                {
                    debug!(id = ?prev.id, title = %prev.title, "save skipped, content unchanged");
                    return Ok(prev);
                }
                doc.id = prev.id.clone();
                doc.created_at = prev.created_at;
            }
            None => {
                let count = self.document_count();
                if count >= self.max_documents {
                    return Err(StorageError::DocumentLimit {
                        count,
                        limit: self.max_documents,
                    });
                }
                if doc.id.is_none() {
                    doc.id = Some(generate_local_id());
                }
            }
        }

        doc.updated_at = now_millis();
        self.write(&doc)?;
        debug!(id = ?doc.id, title = %doc.title, bytes = stored_size, "local save");
        Ok(doc)
    }

    async fn load(&self, identifier: &str) -> Result<Option<Document>, StorageError> {
        if let Some(doc) = self.read(identifier)? {
            return Ok(Some(doc));
        }
        self.find_by_title(identifier)
    }

    async fn list(&self) -> Result<Vec<Document>, StorageError> {
        let mut docs: Vec<Document> = self
            .read_all()?
            .into_iter()
            .filter(|d| !d.is_deleted)
            .collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(docs)
    }

    async fn delete(&self, identifier: &str) -> Result<(), StorageError> {
        let target = match self.read(identifier)? {
            Some(doc) => Some(doc),
            None => self.find_by_title(identifier)?,
        };
        if let Some(doc) = target {
            if let Some(id) = doc.id.as_deref() {
                self.kv.remove(&Self::key_for(id));
                debug!(id = %id, "local delete");
            }
        }
        Ok(())
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }
}
