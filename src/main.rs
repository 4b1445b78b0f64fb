// Define data modules
mod action;         // Board actions (the only way to change tasks)
mod app;            // Router and shared state
mod board;          // Task store: owns the task collection
mod checklist;      // Checklist edits inside a task
mod config;         // Settings from the environment
mod error;          // Skip reasons, storage and API errors
mod logging;        // tracing subscriber setup
mod logic;          // Board reducer
mod models;         // Data structures (Task, Checklist, User)
mod ordering;       // Per-column order_index helpers
mod overdue;        // Overdue predicate and periodic scanner
mod routes_board;   // HTTP handlers for read-only board views
mod routes_tasks;   // HTTP handlers that change the board
mod store;          // Persistent storage (load/save the task blob)

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};

use crate::action::Action;
use crate::board::TaskStore;
use crate::config::StorageBackend;
use crate::overdue::LogNotifier;
use crate::store::{BlobStore, FileBlobStore, MemoryBlobStore, PersistHandle, TaskRepository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;
    logging::init_logging(&settings);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        storage = ?settings.storage,
        data_dir = %settings.data_dir.display(),
        "Starting task board"
    );

    // Load once at startup; a bad or missing file just means an empty board
    let blobs: Arc<dyn BlobStore> = match settings.storage {
        StorageBackend::File => Arc::new(FileBlobStore::new(settings.data_dir.clone())),
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
    };
    let repo = TaskRepository::new(blobs, settings.storage_key.clone());
    let saved = repo.load();
    tracing::info!(key = repo.key(), count = saved.len(), "saved tasks loaded");

    let (persist, writer) = PersistHandle::spawn(repo);
    let mut store = TaskStore::with_persist(persist);
    if !saved.is_empty() {
        store.dispatch(Action::HydrateFromStorage(saved));
    }
    let store = store.into_shared();

    let scanner = overdue::spawn_scanner(
        store.clone(),
        Arc::new(LogNotifier),
        settings.overdue_scan_interval,
    );

    let state = app::AppState::new(store.clone(), settings.clone());
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server_addr))?;

    // Print the link to the server
    tracing::info!("  Server running at http://{}", settings.server_addr);
    tracing::info!("  Static files: http://{}/", settings.server_addr);
    tracing::info!("  API base:     http://{}/api", settings.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Stop the scanner, then let the writer drain the last snapshot.
    // The writer exits once the store (and its persist handle) is gone.
    scanner.abort();
    let _ = scanner.await;
    drop(store);
    store::flush(writer, Duration::from_secs(5)).await;

    tracing::info!("Task board stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
