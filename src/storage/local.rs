//! Local filesystem document store.
//!
//! Keeps every document in one JSON snapshot for development and single-host
//! deployments. Production deployments should use FirestoreStore.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── store.json            # { updated_at, documents: [{ path, fields }] }
//! ```
//!
//! A commit reads the snapshot, applies the batch to a copy, and replaces the
//! file atomically (write to temp, then rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::{CommitSummary, DocPath, Document, DocumentStore, WriteBatch, apply_batch};

const SNAPSHOT_FILE: &str = "store.json";

/// On-disk snapshot format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    /// Time of the last commit
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    documents: Vec<StoredDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    path: DocPath,
    fields: Document,
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
    commit_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.root_dir.join(SNAPSHOT_FILE)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load every document; an absent snapshot is an empty store.
    async fn load(&self) -> Result<BTreeMap<DocPath, Document>> {
        let snapshot: StoreSnapshot = match self.read_bytes(&self.snapshot_path()).await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => StoreSnapshot::default(),
        };
        Ok(snapshot
            .documents
            .into_iter()
            .map(|d| (d.path, d.fields))
            .collect())
    }

    async fn save(&self, docs: BTreeMap<DocPath, Document>) -> Result<()> {
        let snapshot = StoreSnapshot {
            updated_at: Some(Utc::now()),
            documents: docs
                .into_iter()
                .map(|(path, fields)| StoredDocument { path, fields })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        self.write_bytes(&self.snapshot_path(), &bytes).await
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let mut docs = self.load().await?;
        Ok(docs.remove(path))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary> {
        let _guard = self.commit_lock.lock().await;

        let mut docs = self.load().await?;
        let summary = apply_batch(&mut docs, batch)?;
        self.save(docs).await?;

        log::debug!(
            "Committed {} operations to {}",
            summary.total(),
            self.snapshot_path().display()
        );
        Ok(summary)
    }

    fn supports_conditional_create(&self) -> bool {
        true
    }
}
