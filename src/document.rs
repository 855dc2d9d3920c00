//! Document record.
//!
//! The [`Document`] is the unit of storage that flows through the engine,
//! the backends and the sync queue. Callers always see plain `content`;
//! the compressed representation exists only on the medium.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::fingerprint;

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Generate an identifier for a locally-persisted document.
///
/// Format: `local_<epoch_millis>_<8 hex chars>`.
#[must_use]
pub fn generate_local_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("local_{}_{}", now_millis(), &suffix[..8])
}

/// A document record.
///
/// # Example
///
/// ```
/// use scribe_store::Document;
///
/// let doc = Document::new("Notes", "hello");
/// assert!(doc.id.is_none()); // assigned by the backend on first save
/// assert_eq!(doc.title, "Notes");
/// assert_eq!(doc.file_size, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Opaque identifier; absent until the first successful write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Secondary lookup key when the id is unknown. Not guaranteed unique.
    pub title: String,
    /// Document body. Plain in every caller-visible value; compressed on
    /// the medium.
    pub content: String,
    /// Unordered set of tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Byte length of the uncompressed content at last save.
    #[serde(default)]
    pub file_size: u64,
    /// Creation timestamp (epoch millis).
    pub created_at: i64,
    /// Last successful write timestamp (epoch millis). Doubles as the
    /// de facto version marker.
    pub updated_at: i64,
    /// Fingerprint sketch of the plain content, persisted so backends can
    /// detect unchanged saves without decompressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Soft-delete marker.
    #[serde(default)]
    pub is_deleted: bool,
    /// When the soft delete happened (epoch millis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Document {
    /// Create a new, not-yet-persisted document.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = now_millis();
        Self {
            id: None,
            title: title.into(),
            file_size: content.len() as u64,
            content,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            content_hash: None,
            is_deleted: false,
            deleted_at: None,
        }
    }

    /// Attach tags, builder style.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Prepare for a backend write: record the plain size, fingerprint the
    /// plain content, then swap in the compressed representation.
    pub(crate) fn sealed(mut self) -> Self {
        let result = codec::compress(&self.content);
        self.file_size = result.original_size as u64;
        self.content_hash = Some(fingerprint::sketch(&self.content));
        crate::metrics::record_compression(result.original_size, result.compressed_size);
        self.content = result.content;
        self
    }

    /// Restore the caller-visible form: decompress the content. Safe on
    /// already-plain records (pass-through).
    pub(crate) fn unsealed(mut self) -> Self {
        self.content = codec::decompress(&self.content);
        self
    }
}
