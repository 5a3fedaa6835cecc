//! Document store abstractions for member persistence.
//!
//! The store is addressed by slash-free path segments alternating between
//! collection names and document ids:
//!
//! ```text
//! events/{eventRef}                          # { organization: "..." }
//! organizations/{orgId}/members/{userId}     # OrganizationMember
//! ```
//!
//! All pipeline writes go through [`WriteBatch`], which a backend must apply
//! entirely or not at all.

pub mod firestore;
pub mod local;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, StoreBackend, StoreConfig};
use crate::utils::http::create_async_client;

// Re-export for convenience
pub use firestore::FirestoreStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

/// A stored document: top-level field name to JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Location of a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// A document in a top-level collection.
    pub fn root(collection: &str, id: &str) -> Self {
        Self {
            segments: vec![collection.to_string(), id.to_string()],
        }
    }

    /// A document in a subcollection of this document.
    pub fn child(&self, collection: &str, id: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(collection.to_string());
        segments.push(id.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The document id (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Path builders for the collections this pipeline touches.
pub mod paths {
    use super::DocPath;
    use crate::models::{EventReference, OrganizationScope, StoreConfig};

    /// `events/{eventRef}`
    pub fn event(config: &StoreConfig, event: &EventReference) -> DocPath {
        DocPath::root(&config.events_collection, event.as_str())
    }

    /// `organizations/{orgId}/members/{userId}`
    pub fn member(config: &StoreConfig, scope: &OrganizationScope, user_id: &str) -> DocPath {
        DocPath::root(&config.organizations_collection, scope.id())
            .child(&config.members_collection, user_id)
    }
}

/// One staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Replace (or create) the whole document
    Set { path: DocPath, document: Document },
    /// Create the document; fails the batch if it already exists
    Create { path: DocPath, document: Document },
    /// Overwrite the given fields; fails the batch if the document is absent
    Update { path: DocPath, fields: Document },
}

impl BatchOp {
    pub fn path(&self) -> &DocPath {
        match self {
            BatchOp::Set { path, .. } | BatchOp::Create { path, .. } | BatchOp::Update { path, .. } => {
                path
            }
        }
    }
}

/// Ordered list of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: DocPath, document: Document) {
        self.ops.push(BatchOp::Set { path, document });
    }

    pub fn create(&mut self, path: DocPath, document: Document) {
        self.ops.push(BatchOp::Create { path, document });
    }

    pub fn update(&mut self, path: DocPath, fields: Document) {
        self.ops.push(BatchOp::Update { path, fields });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Counts of applied operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub sets: usize,
    pub creates: usize,
    pub updates: usize,
}

impl CommitSummary {
    pub fn total(&self) -> usize {
        self.sets + self.creates + self.updates
    }
}

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document, `None` if absent.
    async fn get(&self, path: &DocPath) -> Result<Option<Document>>;

    /// Replace (or create) a single document.
    async fn set(&self, path: &DocPath, document: Document) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.set(path.clone(), document);
        self.commit(batch).await.map(|_| ())
    }

    /// Overwrite fields of an existing document.
    async fn update(&self, path: &DocPath, fields: Document) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.update(path.clone(), fields);
        self.commit(batch).await.map(|_| ())
    }

    /// Apply every operation in order, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary>;

    /// Whether [`BatchOp::Create`] preconditions are enforced at commit.
    fn supports_conditional_create(&self) -> bool {
        false
    }
}

/// Apply a batch to an in-memory document map.
///
/// Operations run against a copy, so `docs` is untouched on error.
pub(crate) fn apply_batch(
    docs: &mut BTreeMap<DocPath, Document>,
    batch: WriteBatch,
) -> Result<CommitSummary> {
    let mut staged = docs.clone();
    let mut summary = CommitSummary::default();

    for op in batch.into_ops() {
        match op {
            BatchOp::Set { path, document } => {
                staged.insert(path, document);
                summary.sets += 1;
            }
            BatchOp::Create { path, document } => {
                if staged.contains_key(&path) {
                    return Err(AppError::conflict(format!("{path} already exists")));
                }
                staged.insert(path, document);
                summary.creates += 1;
            }
            BatchOp::Update { path, fields } => {
                let doc = staged
                    .get_mut(&path)
                    .ok_or_else(|| AppError::not_found(format!("cannot update missing {path}")))?;
                doc.extend(fields);
                summary.updates += 1;
            }
        }
    }

    *docs = staged;
    Ok(summary)
}

/// Open the backend selected by configuration.
///
/// Remote backends share the HTTP settings used for page fetches.
pub fn open(config: &StoreConfig, http: &HttpConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Local => Arc::new(LocalStore::new(&config.local_path)),
        StoreBackend::Firestore => {
            let client = create_async_client(http)?;
            Arc::new(FirestoreStore::from_config(config, client)?)
        }
    };
    log::debug!("Opened {:?} document store", config.backend);
    Ok(store)
}
