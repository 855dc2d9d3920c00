// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic scribe-store usage example.
//!
//! Demonstrates:
//! 1. Building a local (signed-out) engine over the in-memory medium
//! 2. Saving, editing and listing documents
//! 3. Duplicate-save suppression and transparent compression
//! 4. Switching to a signed-in engine backed by the in-memory table
//! 5. Deferring cloud writes through the sync queue
//! 6. Exporting the full library as JSON
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;
use std::time::Duration;

use scribe_store::{
    AuthSession, CloudBackend, Document, HybridStorageEngine, LocalBackend, MemoryKv,
    MemoryTable, Priority, StorageConfig, SyncQueue,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n=== scribe-store: Basic Usage Example ===\n");

    // ─────────────────────────────────────────────────────────────────────
    // 1. Signed-out: everything lands on the local key-value medium
    // ─────────────────────────────────────────────────────────────────────
    let config = StorageConfig::default();
    let kv = Arc::new(MemoryKv::new());
    let local = Arc::new(LocalBackend::new(kv.clone(), &config));
    let engine =
        HybridStorageEngine::new(config.clone(), &AuthSession::anonymous(), local, None)?;

    let notes = engine
        .save(Document::new("Meeting Notes", "agenda: roadmap review").with_tags(["work"]))
        .await?;
    println!("saved locally with id {}", notes.id.as_deref().unwrap_or("?"));

    // Unchanged content is a no-op
    let again = engine
        .save(Document::new("Meeting Notes", "agenda: roadmap review"))
        .await?;
    println!(
        "duplicate save suppressed: same id = {}",
        again.id == notes.id
    );

    // Large bodies are compressed on the medium, invisible to callers
    let essay = "a long and repetitive draft paragraph. ".repeat(500);
    let saved = engine.save(Document::new("Draft Essay", essay.clone())).await?;
    println!(
        "essay stored: {} plain bytes, content round-trips = {}",
        saved.file_size,
        saved.content == essay
    );

    let info = engine.storage_info();
    println!(
        "local usage: {} files, {} bytes of {:?} quota",
        info.total_files, info.total_size, info.quota_limit
    );

    // ─────────────────────────────────────────────────────────────────────
    // 2. Signed-in: same API, cloud medium
    // ─────────────────────────────────────────────────────────────────────
    let table = Arc::new(MemoryTable::new());
    let local = Arc::new(LocalBackend::new(kv, &config));
    let cloud = Arc::new(CloudBackend::new(table.clone(), "demo-user", &config));
    let engine = HybridStorageEngine::new(
        config.clone(),
        &AuthSession::authenticated("demo-user", "demo-token"),
        local,
        Some(cloud.clone()),
    )?;

    let remote = engine.save(Document::new("Cloud Note", "synced body")).await?;
    println!("\nsaved to cloud with server id {}", remote.id.as_deref().unwrap_or("?"));

    // ─────────────────────────────────────────────────────────────────────
    // 3. Defer writes through the sync queue
    // ─────────────────────────────────────────────────────────────────────
    let queue = SyncQueue::spawn(cloud, &config);
    for i in 0..5 {
        queue.enqueue_save(
            Document::new(format!("Journal {i}"), format!("entry number {i}")),
            Priority::Medium,
        );
    }
    queue.enqueue_save(Document::new("Urgent", "dispatches first"), Priority::High);

    loop {
        let status = queue.status();
        if status.queue_length == 0 && status.active_operations == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    println!("queue drained: {} rows in the cloud table", table.len());
    queue.shutdown();

    // ─────────────────────────────────────────────────────────────────────
    // 4. Export the whole library
    // ─────────────────────────────────────────────────────────────────────
    let bundle = engine.export_all().await?;
    println!("\nexported {} documents:", bundle.total_files);
    for file in &bundle.files {
        println!("  - {} ({} chars)", file.title, file.content.len());
    }

    println!("\ndone");
    Ok(())
}
