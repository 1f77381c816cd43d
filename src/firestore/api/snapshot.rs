use std::collections::BTreeMap;

use serde_json::Value;

use crate::firestore::model::{DocumentKey, FieldPath};
use crate::firestore::value::{document_to_json, FirestoreValue, MapValue, ValueKind};

/// Point-in-time contents of one existing document.
///
/// A missing document is never represented by a snapshot; reads return
/// `Option<DocumentSnapshot>` instead, so an empty document and an absent one
/// stay distinguishable.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    key: DocumentKey,
    data: MapValue,
}

impl DocumentSnapshot {
    pub fn new(key: DocumentKey, data: MapValue) -> Self {
        Self { key, data }
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn data(&self) -> &BTreeMap<String, FirestoreValue> {
        self.data.fields()
    }

    pub fn map_value(&self) -> &MapValue {
        &self.data
    }

    /// Looks up a (possibly nested) field.
    pub fn get(&self, field: &FieldPath) -> Option<&FirestoreValue> {
        let (first, rest) = field.segments().split_first()?;
        let mut current = self.data.get(first)?;
        for segment in rest {
            match current.kind() {
                ValueKind::Map(child) => current = child.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn to_json(&self) -> Value {
        document_to_json(&self.data)
    }

    pub fn into_data(self) -> MapValue {
        self.data
    }
}
