//! Cloud Firestore facade: document CRUD, filtered queries, batched writes
//! and named real-time listeners over an injected [`Datastore`].

pub mod api;
mod constants;
pub mod datastore;
pub mod error;
mod logger;
pub mod model;
mod query_evaluator;
pub mod settings;
pub mod value;

pub use api::{
    BatchOperation, BatchOperationSet, DocumentResult, DocumentSnapshot, FieldFilter, Filter,
    FilterOperator, FilterValue, Firestore, ListResult, ListenerRegistry, OrderDirection, Query,
    QuerySnapshot, QuerySpec, ScalarValue, UnitResult,
};
pub use constants::{AUTO_ID_LENGTH, DEFAULT_MAX_BATCH_WRITES, MAX_DISJUNCTION_SIZE};
pub use datastore::{Datastore, InMemoryDatastore, WriteOperation};
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use logger::logger;
pub use settings::{DuplicateListenerPolicy, FirestoreSettings};
pub use value::{document_from_json, document_to_json, FirestoreValue, MapValue, ValueKind};
