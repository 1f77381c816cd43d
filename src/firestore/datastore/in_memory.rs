use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::firestore::api::{DocumentSnapshot, Query, QuerySnapshot};
use crate::firestore::error::{not_found, FirestoreError, FirestoreResult};
use crate::firestore::model::{DocumentKey, ResourcePath};
use crate::firestore::query_evaluator::apply_query_to_documents;
use crate::firestore::value::MapValue;
use crate::util::subscribe::ListenerRegistration;

use super::{Datastore, SnapshotCallback, WriteOperation};

/// Process-local document store with live query support.
#[derive(Clone, Default)]
pub struct InMemoryDatastore {
    inner: Arc<InMemoryInner>,
}

#[derive(Default)]
struct InMemoryInner {
    documents: Mutex<BTreeMap<DocumentKey, MapValue>>,
    listeners: Mutex<HashMap<u64, Arc<QueryListener>>>,
    next_listener_id: AtomicU64,
    injected_failures: Mutex<VecDeque<FirestoreError>>,
}

struct QueryListener {
    query: Query,
    callback: SnapshotCallback,
    active: AtomicBool,
    delivery: Mutex<DeliveryState>,
}

/// Serializes deliveries per listener. A change that arrives while a delivery
/// is running (including one made from inside the callback) marks the
/// listener dirty, and the running drainer sends one more fresh snapshot.
#[derive(Default)]
struct DeliveryState {
    draining: bool,
    dirty: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next request fail with `error` instead of touching the store.
    /// Queued failures are consumed in order, one per request.
    pub fn fail_next(&self, error: FirestoreError) {
        lock(&self.inner.injected_failures).push_back(error);
    }

    /// Number of live query subscriptions.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    pub fn document_count(&self) -> usize {
        lock(&self.inner.documents).len()
    }

    /// Terminates every live listener on `collection` with `error`, the way a
    /// backend reports a revoked permission. The listeners receive no further
    /// snapshots.
    pub fn fail_listeners(&self, collection: &ResourcePath, error: FirestoreError) {
        let failed: Vec<Arc<QueryListener>> = {
            let mut listeners = lock(&self.inner.listeners);
            let ids: Vec<u64> = listeners
                .iter()
                .filter(|(_, listener)| listener.query.collection_path() == collection)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| listeners.remove(id)).collect()
        };
        for listener in failed {
            if listener.active.swap(false, Ordering::SeqCst) {
                (listener.callback)(Err(error.clone()));
            }
        }
    }

    fn check_injected_failure(&self) -> FirestoreResult<()> {
        match lock(&self.inner.injected_failures).pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn apply_writes(&self, writes: Vec<WriteOperation>) -> FirestoreResult<()> {
        let touched: Vec<ResourcePath> = writes
            .iter()
            .map(|write| write.key().collection_path())
            .collect();

        {
            let mut store = lock(&self.inner.documents);
            // Stage on a copy so a failing write leaves the store untouched.
            let mut staged = store.clone();
            for write in writes {
                apply_write(&mut staged, write)?;
            }
            *store = staged;
        }

        self.notify_listeners(&touched);
        Ok(())
    }

    fn snapshot_for(&self, query: &Query) -> QuerySnapshot {
        let candidates: Vec<DocumentSnapshot> = lock(&self.inner.documents)
            .iter()
            .filter(|(key, _)| query.matches_collection(key))
            .map(|(key, data)| DocumentSnapshot::new(key.clone(), data.clone()))
            .collect();
        QuerySnapshot::new(apply_query_to_documents(candidates, query))
    }

    fn notify_listeners(&self, touched: &[ResourcePath]) {
        let affected: Vec<Arc<QueryListener>> = lock(&self.inner.listeners)
            .values()
            .filter(|listener| touched.contains(listener.query.collection_path()))
            .cloned()
            .collect();
        for listener in affected {
            self.deliver(&listener);
        }
    }

    fn deliver(&self, listener: &QueryListener) {
        {
            let mut state = lock(&listener.delivery);
            state.dirty = true;
            if state.draining {
                return;
            }
            state.draining = true;
        }

        loop {
            {
                let mut state = lock(&listener.delivery);
                if !state.dirty {
                    state.draining = false;
                    return;
                }
                state.dirty = false;
            }
            if !listener.active.load(Ordering::SeqCst) {
                lock(&listener.delivery).draining = false;
                return;
            }
            let snapshot = self.snapshot_for(&listener.query);
            (listener.callback)(Ok(snapshot));
        }
    }
}

fn apply_write(
    store: &mut BTreeMap<DocumentKey, MapValue>,
    write: WriteOperation,
) -> FirestoreResult<()> {
    match write {
        WriteOperation::Set { key, data } => {
            store.insert(key, data);
        }
        WriteOperation::Update { key, data } => {
            let current = store
                .get_mut(&key)
                .ok_or_else(|| not_found(format!("No document to update: {key}")))?;
            current.merge(data);
        }
        WriteOperation::Delete { key } => {
            store.remove(&key);
        }
    }
    Ok(())
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Datastore for InMemoryDatastore {
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<Option<DocumentSnapshot>> {
        self.check_injected_failure()?;
        let store = lock(&self.inner.documents);
        Ok(store
            .get(key)
            .map(|data| DocumentSnapshot::new(key.clone(), data.clone())))
    }

    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()> {
        self.check_injected_failure()?;
        self.apply_writes(vec![WriteOperation::Set {
            key: key.clone(),
            data,
        }])
    }

    async fn update_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()> {
        self.check_injected_failure()?;
        self.apply_writes(vec![WriteOperation::Update {
            key: key.clone(),
            data,
        }])
    }

    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()> {
        self.check_injected_failure()?;
        self.apply_writes(vec![WriteOperation::Delete { key: key.clone() }])
    }

    async fn run_query(&self, query: &Query) -> FirestoreResult<Vec<DocumentSnapshot>> {
        self.check_injected_failure()?;
        Ok(self.snapshot_for(query).into_documents())
    }

    async fn commit(&self, writes: Vec<WriteOperation>) -> FirestoreResult<()> {
        self.check_injected_failure()?;
        self.apply_writes(writes)
    }

    fn listen(
        &self,
        query: &Query,
        callback: SnapshotCallback,
    ) -> FirestoreResult<ListenerRegistration> {
        self.check_injected_failure()?;

        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let listener = Arc::new(QueryListener {
            query: query.clone(),
            callback,
            active: AtomicBool::new(true),
            delivery: Mutex::new(DeliveryState::default()),
        });
        lock(&self.inner.listeners).insert(id, Arc::clone(&listener));

        self.deliver(&listener);

        let inner = Arc::clone(&self.inner);
        Ok(ListenerRegistration::new(move || {
            listener.active.store(false, Ordering::SeqCst);
            lock(&inner.listeners).remove(&id);
        }))
    }
}
