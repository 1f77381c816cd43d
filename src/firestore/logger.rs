use std::sync::LazyLock;

use crate::firestore::constants::LOGGER_NAME;
use crate::logger::Logger;

pub(crate) static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new(LOGGER_NAME));

/// The `@firebase/firestore` logger, for hosts that want to adjust its level
/// or install their own handler.
pub fn logger() -> &'static Logger {
    &LOGGER
}
