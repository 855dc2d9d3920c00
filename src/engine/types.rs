// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Public types for the hybrid storage engine.

use serde::Serialize;

use crate::storage::traits::StorageKind;

/// Identity snapshot supplied by the authentication collaborator.
///
/// The engine evaluates `is_authenticated` once at construction; a session
/// does not change backends mid-flight.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    /// Stable user identifier, when signed in.
    pub user_id: Option<String>,
    /// Access credential for the remote client, when signed in.
    pub access_token: Option<String>,
}

impl AuthSession {
    /// A signed-out, local-only session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session.
    #[must_use]
    pub fn authenticated(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Authenticated means both an identity and a credential are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.access_token.is_some()
    }
}

/// Derived snapshot of the active medium. Never persisted; recomputed from
/// the backend's listing (or from cheap local counters for the sync form).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo {
    pub is_authenticated: bool,
    pub storage_type: StorageKind,
    pub total_files: usize,
    /// Sum of uncompressed document sizes in bytes.
    pub total_size: u64,
    pub quota_used: Option<u64>,
    pub quota_limit: Option<u64>,
    /// Last successful cloud operation (epoch millis).
    pub last_sync: Option<i64>,
}

impl std::fmt::Display for StorageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} storage: {} files, {} bytes",
            self.storage_type, self.total_files, self.total_size
        )
    }
}
