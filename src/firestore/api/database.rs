use std::sync::Arc;

use async_channel::Receiver;

use crate::firestore::datastore::{Datastore, InMemoryDatastore};
use crate::firestore::error::{FirestoreError, FirestoreResult};
use crate::firestore::logger::LOGGER;
use crate::firestore::model::DocumentKey;
use crate::firestore::settings::FirestoreSettings;
use crate::firestore::value::MapValue;

use super::batch::BatchOperationSet;
use super::listener_registry::{ListResultCallback, ListenerRegistry};
use super::query::{Query, QuerySpec};
use super::result::ListResult;
use super::snapshot::DocumentSnapshot;

/// Entry point for document CRUD, queries, batched writes and named
/// listeners over an injected [`Datastore`].
///
/// Cloning is cheap; clones share the datastore and the listener registry.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    datastore: Arc<dyn Datastore>,
    settings: FirestoreSettings,
    listeners: ListenerRegistry,
}

impl Firestore {
    /// Builds a facade over `datastore`, validating `settings` first.
    pub fn new(
        datastore: Arc<dyn Datastore>,
        settings: FirestoreSettings,
    ) -> FirestoreResult<Self> {
        settings.validate()?;
        if let Some(level) = settings.log_level {
            LOGGER.set_log_level(level);
        }
        Ok(Self::from_parts(datastore, settings))
    }

    /// A facade over a fresh [`InMemoryDatastore`] with default settings.
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(InMemoryDatastore::new()),
            FirestoreSettings::default(),
        )
    }

    fn from_parts(datastore: Arc<dyn Datastore>, settings: FirestoreSettings) -> Self {
        let listeners = ListenerRegistry::new(settings.duplicate_listener_policy);
        Self {
            inner: Arc::new(FirestoreInner {
                datastore,
                settings,
                listeners,
            }),
        }
    }

    pub fn settings(&self) -> &FirestoreSettings {
        &self.inner.settings
    }

    pub fn datastore(&self) -> Arc<dyn Datastore> {
        Arc::clone(&self.inner.datastore)
    }

    /// Writes `data` as the full content of `collection/document_id`,
    /// replacing whatever was stored there.
    pub async fn add_document(
        &self,
        collection: &str,
        document_id: &str,
        data: MapValue,
    ) -> FirestoreResult<()> {
        let key = document_key(collection, document_id)?;
        self.inner.datastore.set_document(&key, data).await
    }

    /// Reads one document. `Ok(None)` means it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> FirestoreResult<Option<DocumentSnapshot>> {
        let key = document_key(collection, document_id)?;
        self.inner.datastore.get_document(&key).await
    }

    pub async fn get_all_documents(
        &self,
        collection: &str,
    ) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let query = Query::new(collection).inspect_err(log_rejected)?;
        self.inner.datastore.run_query(&query).await
    }

    /// Merges the top-level fields of `data` into an existing document.
    pub async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: MapValue,
    ) -> FirestoreResult<()> {
        let key = document_key(collection, document_id)?;
        self.inner.datastore.update_document(&key, data).await
    }

    /// Deletes a document. Deleting a missing document succeeds.
    pub async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> FirestoreResult<()> {
        let key = document_key(collection, document_id)?;
        self.inner.datastore.delete_document(&key).await
    }

    /// Builds `spec` into a query and runs it. No matches is an empty result.
    pub async fn execute_query(
        &self,
        spec: &QuerySpec,
    ) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let query = spec.to_query().inspect_err(log_rejected)?;
        self.run_query(&query).await
    }

    pub async fn run_query(&self, query: &Query) -> FirestoreResult<Vec<DocumentSnapshot>> {
        self.inner.datastore.run_query(query).await
    }

    /// Commits every operation in `batch` atomically. Descriptors are
    /// validated up front, so an invalid one means nothing is sent.
    pub async fn batch_write(&self, batch: BatchOperationSet) -> FirestoreResult<()> {
        let writes = batch
            .into_writes(self.inner.settings.max_batch_writes)
            .inspect_err(log_rejected)?;
        if writes.is_empty() {
            return Ok(());
        }
        LOGGER.debug(format!("Committing batch of {} write(s)", writes.len()));
        self.inner.datastore.commit(writes).await
    }

    /// Streams every document of `collection` to `callback` under
    /// `listener_id` until [`stop_listener`](Self::stop_listener).
    pub fn start_listener<F>(
        &self,
        collection: &str,
        listener_id: &str,
        callback: F,
    ) -> FirestoreResult<()>
    where
        F: Fn(ListResult) + Send + Sync + 'static,
    {
        let query = Query::new(collection).inspect_err(log_rejected)?;
        self.listen_query(&query, listener_id, Arc::new(callback))
    }

    /// Like [`start_listener`](Self::start_listener) for a filtered query.
    pub fn start_query_listener<F>(
        &self,
        spec: &QuerySpec,
        listener_id: &str,
        callback: F,
    ) -> FirestoreResult<()>
    where
        F: Fn(ListResult) + Send + Sync + 'static,
    {
        let query = spec.to_query().inspect_err(log_rejected)?;
        self.listen_query(&query, listener_id, Arc::new(callback))
    }

    /// Registers a listener whose deliveries arrive on the returned channel.
    ///
    /// The subscription belongs to the registry like any other listener and
    /// stays active until `listener_id` is stopped, even if the receiver is
    /// dropped.
    pub fn listen_stream(
        &self,
        spec: &QuerySpec,
        listener_id: &str,
    ) -> FirestoreResult<Receiver<ListResult>> {
        let query = spec.to_query().inspect_err(log_rejected)?;
        let (sender, receiver) = async_channel::unbounded();
        let id = listener_id.to_owned();
        let callback: ListResultCallback = Arc::new(move |result| {
            if sender.try_send(result).is_err() {
                LOGGER.debug(format!("Receiver of listener '{id}' is gone"));
            }
        });
        self.listen_query(&query, listener_id, callback)?;
        Ok(receiver)
    }

    fn listen_query(
        &self,
        query: &Query,
        listener_id: &str,
        callback: ListResultCallback,
    ) -> FirestoreResult<()> {
        self.inner
            .listeners
            .start(self.inner.datastore.as_ref(), listener_id, query, callback)
    }

    /// Cancels `listener_id`. Returns `false` when nothing was registered.
    pub fn stop_listener(&self, listener_id: &str) -> bool {
        self.inner.listeners.stop(listener_id)
    }

    /// Cancels every listener; returns how many were active.
    pub fn stop_all_listeners(&self) -> usize {
        self.inner.listeners.stop_all()
    }

    pub fn is_listening(&self, listener_id: &str) -> bool {
        self.inner.listeners.is_listening(listener_id)
    }

    pub fn active_listener_ids(&self) -> Vec<String> {
        self.inner.listeners.active_listener_ids()
    }
}

fn document_key(collection: &str, document_id: &str) -> FirestoreResult<DocumentKey> {
    DocumentKey::new(collection, document_id).inspect_err(log_rejected)
}

fn log_rejected(err: &FirestoreError) {
    LOGGER.warn(format!("Rejected request: {err}"));
}
