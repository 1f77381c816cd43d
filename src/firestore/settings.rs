use serde::{Deserialize, Serialize};

use crate::firestore::constants::DEFAULT_MAX_BATCH_WRITES;
use crate::firestore::error::{invalid_input, FirestoreResult};
use crate::logger::LogLevel;

/// What `start` does when the listener id is already registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateListenerPolicy {
    /// Cancel the existing subscription and register the new one in its place.
    #[default]
    Replace,
    /// Keep the existing subscription and fail the new registration.
    Reject,
}

/// Facade configuration, supplied once when the [`Firestore`](crate::firestore::Firestore)
/// handle is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreSettings {
    /// Maximum number of operations accepted by a single batch write.
    pub max_batch_writes: usize,
    pub duplicate_listener_policy: DuplicateListenerPolicy,
    /// When set, applied to the Firestore logger at construction time.
    pub log_level: Option<LogLevel>,
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            max_batch_writes: DEFAULT_MAX_BATCH_WRITES,
            duplicate_listener_policy: DuplicateListenerPolicy::default(),
            log_level: None,
        }
    }
}

impl FirestoreSettings {
    /// Parses settings from JSON; omitted keys keep their defaults.
    pub fn from_json(input: &str) -> FirestoreResult<Self> {
        let settings: Self = serde_json::from_str(input)
            .map_err(|err| invalid_input(format!("Invalid Firestore settings: {err}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> FirestoreResult<()> {
        if self.max_batch_writes == 0 {
            return Err(invalid_input("max_batch_writes must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let settings = FirestoreSettings::from_json("{}").unwrap();
        assert_eq!(settings, FirestoreSettings::default());
        assert_eq!(settings.max_batch_writes, 500);
    }

    #[test]
    fn parses_policy_and_level() {
        let settings = FirestoreSettings::from_json(
            r#"{"duplicate_listener_policy": "reject", "log_level": "debug"}"#,
        )
        .unwrap();
        assert_eq!(
            settings.duplicate_listener_policy,
            DuplicateListenerPolicy::Reject
        );
        assert_eq!(settings.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = FirestoreSettings::from_json(r#"{"max_batch_writes": 0}"#).unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }
}
