mod batch;
mod callbacks;
mod database;
mod filter;
mod listener_registry;
mod query;
mod result;
mod snapshot;

pub use batch::{BatchOperation, BatchOperationSet};
pub use database::Firestore;
pub use filter::{FieldFilter, Filter, FilterOperator, FilterValue, ScalarValue};
pub use listener_registry::{ListResultCallback, ListenerRegistry};
pub use query::{OrderBy, OrderDirection, Query, QuerySnapshot, QuerySpec};
pub use result::{DocumentResult, ListResult, UnitResult};
pub use snapshot::DocumentSnapshot;
