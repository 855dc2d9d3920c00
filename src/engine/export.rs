// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-library export.
//!
//! Produces a single transportable bundle of every currently-visible
//! document on the active medium. The bundle shape is user-facing data and
//! stays stable: a list of `{title, content, tags, created_at, updated_at}`
//! plus `export_date` and `total_files`.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::document::now_millis;
use crate::storage::traits::StorageError;

use super::HybridStorageEngine;

/// One document in an export bundle, plain content included.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportedDocument {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The transportable export artifact.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportBundle {
    /// When the export was taken (epoch millis).
    pub export_date: i64,
    pub total_files: usize,
    pub files: Vec<ExportedDocument>,
}

impl HybridStorageEngine {
    /// Export every visible document from the active medium.
    ///
    /// Listings that omitted content are completed with per-document loads;
    /// any underlying `list`/`load` failure propagates.
    pub async fn export_all(&self) -> Result<ExportBundle, StorageError> {
        let backend = self.active()?;
        let listed = backend.list().await?;

        let mut files = Vec::with_capacity(listed.len());
        for doc in listed {
            let doc = if doc.content.is_empty() && doc.file_size > 0 {
                match doc.id.as_deref() {
                    Some(id) => backend.load(id).await?.unwrap_or(doc),
                    None => doc,
                }
            } else {
                doc
            };
            let doc = doc.unsealed();
            files.push(ExportedDocument {
                title: doc.title,
                content: doc.content,
                tags: doc.tags,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
            });
        }

        Ok(ExportBundle {
            export_date: now_millis(),
            total_files: files.len(),
            files,
        })
    }

    /// [`Self::export_all`], serialized to JSON bytes.
    pub async fn export_all_json(&self) -> Result<Vec<u8>, StorageError> {
        let bundle = self.export_all().await?;
        serde_json::to_vec(&bundle)
            .map_err(|e| StorageError::Backend(format!("failed to serialize export: {e}")))
    }
}
