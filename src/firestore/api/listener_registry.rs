use std::collections::HashMap;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::firestore::datastore::{Datastore, SnapshotCallback};
use crate::firestore::error::{already_exists, invalid_input, FirestoreResult};
use crate::firestore::logger::LOGGER;
use crate::firestore::settings::DuplicateListenerPolicy;
use crate::util::subscribe::ListenerRegistration;

use super::query::{Query, QuerySnapshot};
use super::result::ListResult;

/// Receives every delivery of a named listener.
pub type ListResultCallback = Arc<dyn Fn(ListResult) + Send + Sync + 'static>;

/// Named live subscriptions, keyed by caller-supplied ids.
///
/// The registry owns each subscription's cancellation. `stop` and `stop_all`
/// detach the underlying subscription after releasing the map lock, and each
/// entry carries its own liveness flag so nothing is forwarded once it has
/// been stopped or replaced.
pub struct ListenerRegistry {
    policy: DuplicateListenerPolicy,
    entries: Mutex<HashMap<String, ListenerEntry>>,
}

struct ListenerEntry {
    alive: Arc<AtomicBool>,
    /// `None` while the subscription is being established.
    registration: Option<ListenerRegistration>,
}

impl ListenerEntry {
    fn cancel(self) {
        self.alive.store(false, Ordering::SeqCst);
        drop(self.registration);
    }
}

impl ListenerRegistry {
    pub fn new(policy: DuplicateListenerPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes `query` under `listener_id`.
    ///
    /// The callback receives the current result set right away and again
    /// after every change, until the id is stopped. When the id is already
    /// registered the configured [`DuplicateListenerPolicy`] decides between
    /// replacing the previous subscription and failing with `already-exists`.
    pub fn start(
        &self,
        datastore: &dyn Datastore,
        listener_id: &str,
        query: &Query,
        callback: ListResultCallback,
    ) -> FirestoreResult<()> {
        if listener_id.trim().is_empty() {
            return Err(invalid_input("Listener id cannot be empty"));
        }

        let alive = Arc::new(AtomicBool::new(true));
        let replaced = {
            let mut entries = self.lock_entries();
            if entries.contains_key(listener_id) && self.policy == DuplicateListenerPolicy::Reject {
                LOGGER.warn(format!("Listener '{listener_id}' is already registered"));
                return Err(already_exists(format!(
                    "Listener '{listener_id}' is already registered"
                ))
                .raised_locally());
            }
            entries.insert(
                listener_id.to_owned(),
                ListenerEntry {
                    alive: Arc::clone(&alive),
                    registration: None,
                },
            )
        };
        if let Some(previous) = replaced {
            LOGGER.warn(format!("Replacing listener '{listener_id}'"));
            previous.cancel();
        }

        let forward_alive = Arc::clone(&alive);
        let forward: SnapshotCallback = Arc::new(move |result| {
            if forward_alive.load(Ordering::SeqCst) {
                callback(ListResult::from(result.map(QuerySnapshot::into_documents)));
            }
        });

        let registration = match datastore.listen(query, forward) {
            Ok(registration) => registration,
            Err(err) => {
                self.remove_if_current(listener_id, &alive);
                return Err(err);
            }
        };

        let mut entries = self.lock_entries();
        match entries.get_mut(listener_id) {
            Some(entry) if Arc::ptr_eq(&entry.alive, &alive) => {
                entry.registration = Some(registration);
                drop(entries);
                LOGGER.debug(format!(
                    "Listener '{listener_id}' started on {}",
                    query.collection_path()
                ));
            }
            _ => {
                // Stopped or replaced while the subscription was being set up.
                drop(entries);
                alive.store(false, Ordering::SeqCst);
                registration.detach();
            }
        }
        Ok(())
    }

    /// Cancels and forgets `listener_id`. Returns whether it was registered.
    pub fn stop(&self, listener_id: &str) -> bool {
        let removed = self.lock_entries().remove(listener_id);
        match removed {
            Some(entry) => {
                entry.cancel();
                LOGGER.debug(format!("Listener '{listener_id}' stopped"));
                true
            }
            None => false,
        }
    }

    /// Cancels every listener and returns how many were registered.
    pub fn stop_all(&self) -> usize {
        let drained = mem::take(&mut *self.lock_entries());
        let count = drained.len();
        for entry in drained.into_values() {
            entry.cancel();
        }
        if count > 0 {
            LOGGER.debug(format!("Stopped {count} listener(s)"));
        }
        count
    }

    pub fn is_listening(&self, listener_id: &str) -> bool {
        self.lock_entries().contains_key(listener_id)
    }

    /// Registered ids in lexical order.
    pub fn active_listener_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock_entries().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_if_current(&self, listener_id: &str, alive: &Arc<AtomicBool>) {
        let mut entries = self.lock_entries();
        if entries
            .get(listener_id)
            .is_some_and(|entry| Arc::ptr_eq(&entry.alive, alive))
        {
            entries.remove(listener_id);
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, ListenerEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new(DuplicateListenerPolicy::default())
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
