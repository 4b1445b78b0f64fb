// --------------------------------------------------
// Task persistence.
//
// Tasks are saved as one JSON array under a fixed key in a
// key-value blob store. Loading never fails: anything that is
// missing or unreadable starts the board empty.
// --------------------------------------------------

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::board::Persist;
use crate::error::StorageError;
use crate::models::Task;

pub const DEFAULT_STORAGE_KEY: &str = "lypd-todo-tasks-v2";

// Minimal key-value blob store
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// One `<key>.json` file per key under `dir`
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBlobStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // temp file + rename so a crash never leaves half a file behind
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.blobs.lock().remove(key);
        Ok(())
    }
}

// Decode a stored payload. Anything but a JSON array of tasks is rejected.
pub fn decode_tasks(text: &str) -> Result<Vec<Task>, StorageError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Err(StorageError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

// Task collection bound to one storage key
#[derive(Clone)]
pub struct TaskRepository {
    blobs: Arc<dyn BlobStore>,
    key: String,
}

impl TaskRepository {
    pub fn new(blobs: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        TaskRepository {
            blobs,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // Saved tasks in storage order; empty when nothing usable is stored.
    pub fn load(&self) -> Vec<Task> {
        let text = match self.blobs.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to read saved tasks");
                return Vec::new();
            }
        };

        match decode_tasks(&text) {
            Ok(tasks) => {
                tracing::debug!(key = %self.key, count = tasks.len(), "loaded saved tasks");
                tasks
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to decode saved tasks");
                Vec::new()
            }
        }
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let text = serde_json::to_string(tasks)?;
        self.blobs.set(&self.key, &text)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.blobs.remove(&self.key)
    }
}

// Synchronous sink, used when no runtime is around (tests, tooling)
impl Persist for TaskRepository {
    fn persist(&mut self, tasks: &[Task]) {
        if let Err(e) = self.save(tasks) {
            tracing::error!(key = %self.key, error = %e, "failed to save tasks");
        }
    }

    fn clear(&mut self) {
        if let Err(e) = TaskRepository::clear(self) {
            tracing::error!(key = %self.key, error = %e, "failed to clear saved tasks");
        }
    }
}

// What the background writer is asked to do
#[derive(Debug)]
enum WriteOp {
    Save(Vec<Task>),
    Clear,
}

// Fire-and-forget sink: snapshots go to a background writer task.
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl PersistHandle {
    // Must be called inside a tokio runtime.
    pub fn spawn(repo: TaskRepository) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(write_snapshots(repo, rx));
        (PersistHandle { tx }, worker)
    }

    fn send(&self, op: WriteOp) {
        if self.tx.send(op).is_err() {
            tracing::warn!("persist worker stopped; change kept in memory only");
        }
    }
}

impl Persist for PersistHandle {
    fn persist(&mut self, tasks: &[Task]) {
        self.send(WriteOp::Save(tasks.to_vec()));
    }

    fn clear(&mut self) {
        self.send(WriteOp::Clear);
    }
}

// Runs until every PersistHandle is dropped.
async fn write_snapshots(repo: TaskRepository, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(mut op) = rx.recv().await {
        // only the newest request matters
        while let Ok(newer) = rx.try_recv() {
            op = newer;
        }

        let writer = repo.clone();
        let result = match op {
            WriteOp::Save(snapshot) => {
                let count = snapshot.len();
                tokio::task::spawn_blocking(move || writer.save(&snapshot))
                    .await
                    .map(|r| r.map(|()| tracing::debug!(count, "tasks saved")))
            }
            WriteOp::Clear => tokio::task::spawn_blocking(move || writer.clear())
                .await
                .map(|r| r.map(|()| tracing::debug!("saved tasks cleared"))),
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "failed to write tasks"),
            Err(e) => tracing::error!(error = %e, "write task panicked"),
        }
    }
    tracing::debug!("persist worker finished");
}

// Give the writer a moment to drain on shutdown.
pub async fn flush(worker: tokio::task::JoinHandle<()>, timeout: Duration) {
    if tokio::time::timeout(timeout, worker).await.is_err() {
        tracing::warn!("persist worker did not finish before shutdown");
    }
}
