pub(crate) const LOGGER_NAME: &str = "@firebase/firestore";

/// Length of generated document ids.
pub const AUTO_ID_LENGTH: usize = 20;

/// Upper bound on operations committed by a single batch.
pub const DEFAULT_MAX_BATCH_WRITES: usize = 500;

/// Upper bound on the elements of an `in`, `not-in` or `array-contains-any` filter.
pub const MAX_DISJUNCTION_SIZE: usize = 30;
