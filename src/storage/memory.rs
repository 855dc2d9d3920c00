// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory collaborator implementations.
//!
//! [`MemoryKv`] is the default key-value medium for unauthenticated use and
//! tests; [`MemoryTable`] is an in-process documents table with the same
//! contract a real remote client must honor (owner scoping, `updated_at`
//! ordering, content omission).

use dashmap::DashMap;

use async_trait::async_trait;

use super::cloud::{DocumentRow, DocumentTable, RowFilter};
use super::local::KeyValueStore;
use super::traits::StorageError;

/// DashMap-backed [`KeyValueStore`].
pub struct MemoryKv {
    data: DashMap<String, String>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get current entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.data.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.data.iter().map(|r| r.key().clone()).collect()
    }
}

/// DashMap-backed [`DocumentTable`] with server-assigned uuid ids.
pub struct MemoryTable {
    rows: DashMap<String, DocumentRow>,
}

impl MemoryTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Get current row count (tombstones included)
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clear all rows
    pub fn clear(&self) {
        self.rows.clear();
    }

    fn matches(filter: &RowFilter, row: &DocumentRow) -> bool {
        if let Some(ref id) = filter.id {
            if &row.id != id {
                return false;
            }
        }
        if let Some(ref owner) = filter.owner_id {
            if &row.owner_id != owner {
                return false;
            }
        }
        if let Some(ref title) = filter.title {
            if &row.title != title {
                return false;
            }
        }
        if !filter.include_deleted && row.is_deleted {
            return false;
        }
        true
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentTable for MemoryTable {
    async fn select(&self, filter: &RowFilter) -> Result<Vec<DocumentRow>, StorageError> {
        let mut rows: Vec<DocumentRow> = self
            .rows
            .iter()
            .filter(|r| Self::matches(filter, r.value()))
            .map(|r| r.value().clone())
            .collect();

        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        if !filter.include_content {
            for row in &mut rows {
                row.content = None;
            }
        }
        Ok(rows)
    }

    async fn insert(&self, mut row: DocumentRow) -> Result<DocumentRow, StorageError> {
        if row.id.is_empty() {
            row.id = uuid::Uuid::new_v4().to_string();
        }
        self.rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn update(&self, id: &str, mut row: DocumentRow) -> Result<DocumentRow, StorageError> {
        if !self.rows.contains_key(id) {
            return Err(StorageError::Backend(format!("row '{id}' not found")));
        }
        row.id = id.to_string();
        self.rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.rows.remove(id);
        Ok(())
    }
}
