//! Uniform "data + error" results handed to host layers.
//!
//! Each result holds either its payload or an error, never both. A
//! [`DocumentResult`] without an error and without data means the document
//! does not exist.

use serde_json::Value;

use crate::firestore::error::{FirestoreError, FirestoreResult};

use super::snapshot::DocumentSnapshot;

/// Outcome of a write: only an optional error.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitResult {
    error: Option<FirestoreError>,
}

impl UnitResult {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn failed(error: FirestoreError) -> Self {
        Self { error: Some(error) }
    }

    pub fn error(&self) -> Option<&FirestoreError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> FirestoreResult<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl From<FirestoreResult<()>> for UnitResult {
    fn from(result: FirestoreResult<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(error) => Self::failed(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum DocumentOutcome {
    Found(DocumentSnapshot),
    Missing,
    Failed(FirestoreError),
}

/// Outcome of a single-document read.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentResult {
    outcome: DocumentOutcome,
}

impl DocumentResult {
    pub fn found(snapshot: DocumentSnapshot) -> Self {
        Self {
            outcome: DocumentOutcome::Found(snapshot),
        }
    }

    pub fn missing() -> Self {
        Self {
            outcome: DocumentOutcome::Missing,
        }
    }

    pub fn failed(error: FirestoreError) -> Self {
        Self {
            outcome: DocumentOutcome::Failed(error),
        }
    }

    pub fn data(&self) -> Option<&DocumentSnapshot> {
        match &self.outcome {
            DocumentOutcome::Found(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FirestoreError> {
        match &self.outcome {
            DocumentOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// True when the read succeeded and the document does not exist.
    pub fn is_missing(&self) -> bool {
        matches!(self.outcome, DocumentOutcome::Missing)
    }

    /// Document fields as a JSON object, or `null` when absent or failed.
    pub fn data_json(&self) -> Value {
        self.data().map_or(Value::Null, DocumentSnapshot::to_json)
    }

    pub fn into_result(self) -> FirestoreResult<Option<DocumentSnapshot>> {
        match self.outcome {
            DocumentOutcome::Found(snapshot) => Ok(Some(snapshot)),
            DocumentOutcome::Missing => Ok(None),
            DocumentOutcome::Failed(error) => Err(error),
        }
    }
}

impl From<FirestoreResult<Option<DocumentSnapshot>>> for DocumentResult {
    fn from(result: FirestoreResult<Option<DocumentSnapshot>>) -> Self {
        match result {
            Ok(Some(snapshot)) => Self::found(snapshot),
            Ok(None) => Self::missing(),
            Err(error) => Self::failed(error),
        }
    }
}

/// Outcome of a collection read, query or listener delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct ListResult {
    outcome: Result<Vec<DocumentSnapshot>, FirestoreError>,
}

impl ListResult {
    pub fn documents(documents: Vec<DocumentSnapshot>) -> Self {
        Self {
            outcome: Ok(documents),
        }
    }

    pub fn failed(error: FirestoreError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    pub fn data(&self) -> Option<&[DocumentSnapshot]> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&FirestoreError> {
        self.outcome.as_ref().err()
    }

    /// Documents as an array of JSON objects, or `null` on error.
    pub fn data_json(&self) -> Value {
        match &self.outcome {
            Ok(documents) => Value::Array(documents.iter().map(DocumentSnapshot::to_json).collect()),
            Err(_) => Value::Null,
        }
    }

    pub fn into_result(self) -> FirestoreResult<Vec<DocumentSnapshot>> {
        self.outcome
    }
}

impl From<FirestoreResult<Vec<DocumentSnapshot>>> for ListResult {
    fn from(outcome: FirestoreResult<Vec<DocumentSnapshot>>) -> Self {
        Self { outcome }
    }
}
