//! Outbound seam to the document store.
//!
//! The facade never talks to a backend directly; it is handed an
//! `Arc<dyn Datastore>` at construction. [`InMemoryDatastore`] evaluates
//! queries locally and is the collaborator used by tests and demos.

use std::sync::Arc;

use async_trait::async_trait;

use crate::firestore::api::{DocumentSnapshot, Query, QuerySnapshot};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::DocumentKey;
use crate::firestore::value::MapValue;
use crate::util::subscribe::ListenerRegistration;

pub mod in_memory;

pub use in_memory::InMemoryDatastore;

#[derive(Clone, Debug, PartialEq)]
pub enum WriteOperation {
    /// Full overwrite, creating the document when missing.
    Set { key: DocumentKey, data: MapValue },
    /// Merge of the supplied top-level fields into an existing document.
    Update { key: DocumentKey, data: MapValue },
    Delete { key: DocumentKey },
}

impl WriteOperation {
    pub fn key(&self) -> &DocumentKey {
        match self {
            WriteOperation::Set { key, .. }
            | WriteOperation::Update { key, .. }
            | WriteOperation::Delete { key } => key,
        }
    }
}

/// Receives every snapshot (or error) of a live query.
pub type SnapshotCallback = Arc<dyn Fn(FirestoreResult<QuerySnapshot>) + Send + Sync + 'static>;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Datastore: Send + Sync + 'static {
    /// Returns `None` when the document does not exist.
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<Option<DocumentSnapshot>>;
    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()>;
    async fn update_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()>;
    /// Deleting a missing document succeeds.
    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()>;
    async fn run_query(&self, query: &Query) -> FirestoreResult<Vec<DocumentSnapshot>>;
    /// Applies every write or none of them.
    async fn commit(&self, writes: Vec<WriteOperation>) -> FirestoreResult<()>;
    /// Subscribes to `query`. The callback receives a full snapshot for the
    /// current state and again after every change, until the returned
    /// registration is detached or dropped.
    fn listen(
        &self,
        query: &Query,
        callback: SnapshotCallback,
    ) -> FirestoreResult<ListenerRegistration>;
}
