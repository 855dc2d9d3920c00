// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage-info snapshots.
//!
//! The synchronous form is cheap and exact for the local medium (direct
//! counter scan) but only a placeholder for the cloud medium, where totals
//! require a remote listing. Callers needing accuracy regardless of medium
//! use the async form.

use crate::storage::traits::{StorageError, StorageKind};

use super::{HybridStorageEngine, StorageInfo};

impl HybridStorageEngine {
    /// Cheap synchronous snapshot.
    ///
    /// Local: accurate (scans local records). Cloud: zeroed totals pending
    /// an async refresh; only the flags and `last_sync` are meaningful.
    #[must_use]
    pub fn storage_info(&self) -> StorageInfo {
        if self.is_authenticated() {
            StorageInfo {
                is_authenticated: true,
                storage_type: StorageKind::Cloud,
                total_files: 0,
                total_size: 0,
                quota_used: None,
                quota_limit: None,
                last_sync: self.last_sync(),
            }
        } else {
            let total_size = self.local.total_bytes();
            StorageInfo {
                is_authenticated: false,
                storage_type: StorageKind::Local,
                total_files: self.local.document_count(),
                total_size,
                quota_used: Some(total_size),
                quota_limit: Some(self.config().local_quota_bytes),
                last_sync: None,
            }
        }
    }

    /// Accurate snapshot for either medium, via the active backend's listing.
    pub async fn storage_info_async(&self) -> Result<StorageInfo, StorageError> {
        let backend = self.active()?;
        let docs = backend.list().await?;

        let total_files = docs.len();
        let total_size: u64 = docs.iter().map(|d| d.file_size).sum();
        let (quota_used, quota_limit) = match backend.kind() {
            StorageKind::Local => (Some(total_size), Some(self.config().local_quota_bytes)),
            StorageKind::Cloud => (None, None),
        };

        Ok(StorageInfo {
            is_authenticated: self.is_authenticated(),
            storage_type: backend.kind(),
            total_files,
            total_size,
            quota_used,
            quota_limit,
            last_sync: self.last_sync(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::StorageConfig;
    use crate::document::Document;
    use crate::engine::AuthSession;
    use crate::storage::cloud::CloudBackend;
    use crate::storage::local::LocalBackend;
    use crate::storage::memory::{MemoryKv, MemoryTable};

    use super::super::HybridStorageEngine;
    use super::*;

    #[tokio::test]
    async fn test_local_sync_info_is_accurate() {
        let config = StorageConfig::default();
        let local = Arc::new(LocalBackend::new(Arc::new(MemoryKv::new()), &config));
        let engine = HybridStorageEngine::new(
            config.clone(),
            &AuthSession::anonymous(),
            local,
            None,
        )
        .unwrap();

        engine.save(Document::new("a", "12345")).await.unwrap();
        engine.save(Document::new("b", "123")).await.unwrap();

        let info = engine.storage_info();
        assert!(!info.is_authenticated);
        assert_eq!(info.storage_type, StorageKind::Local);
        assert_eq!(info.total_files, 2);
        assert_eq!(info.total_size, 8);
        assert_eq!(info.quota_used, Some(8));
        assert_eq!(info.quota_limit, Some(config.local_quota_bytes));
    }

    #[tokio::test]
    async fn test_cloud_sync_info_is_placeholder() {
        let config = StorageConfig::default();
        let local = Arc::new(LocalBackend::new(Arc::new(MemoryKv::new()), &config));
        let cloud = Arc::new(CloudBackend::new(
            Arc::new(MemoryTable::new()),
            "u",
            &config,
        ));
        let engine = HybridStorageEngine::new(
            config,
            &AuthSession::authenticated("u", "tok"),
            local,
            Some(cloud),
        )
        .unwrap();

        engine.save(Document::new("a", "12345")).await.unwrap();

        // Sync form does not know cloud totals.
        let info = engine.storage_info();
        assert_eq!(info.storage_type, StorageKind::Cloud);
        assert_eq!(info.total_files, 0);
        assert!(info.last_sync.is_some());

        // Async form does.
        let info = engine.storage_info_async().await.unwrap();
        assert_eq!(info.total_files, 1);
        assert_eq!(info.total_size, 5);
        assert!(info.quota_limit.is_none());
    }
}
