// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage backends (local key-value, cloud table, in-memory collaborators).

pub mod cloud;
pub mod local;
pub mod memory;
pub mod traits;
