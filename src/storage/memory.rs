//! In-process document store.
//!
//! Used for tests and dry runs; contents are lost when the process exits.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::{CommitSummary, DocPath, Document, DocumentStore, WriteBatch, apply_batch};

/// Document store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<DocPath, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with documents.
    pub fn with_documents(docs: impl IntoIterator<Item = (DocPath, Document)>) -> Self {
        Self {
            docs: RwLock::new(docs.into_iter().collect()),
        }
    }

    /// Copy of every stored document.
    pub fn snapshot(&self) -> Result<BTreeMap<DocPath, Document>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.clone())
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> AppError {
    AppError::store("memory store lock poisoned")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        Ok(docs.get(path).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        apply_batch(&mut docs, batch)
    }

    fn supports_conditional_create(&self) -> bool {
        true
    }
}
