//! Cloud Firestore facade for host applications.
//!
//! The [`firestore::Firestore`] handle wraps an injected
//! [`firestore::Datastore`] and exposes document CRUD, filtered queries,
//! atomic batched writes and named real-time listeners. Every operation is
//! available as a future, and the CRUD and query operations also come in a
//! callback flavour delivering uniform `data + error` results.
//!
//! ```
//! use kfirebase_firestore::firestore::{Firestore, MapValue, FirestoreValue};
//!
//! # futures::executor::block_on(async {
//! let firestore = Firestore::in_memory();
//! let data: MapValue = [("name", FirestoreValue::from_string("Ada"))].into_iter().collect();
//! firestore.add_document("users", "ada", data).await?;
//! let snapshot = firestore.get_document("users", "ada").await?;
//! assert!(snapshot.is_some());
//! # Ok::<(), kfirebase_firestore::firestore::FirestoreError>(())
//! # }).unwrap();
//! ```

pub mod firestore;
pub mod logger;
pub mod platform;
pub mod util;
