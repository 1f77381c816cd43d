use serde::{Deserialize, Serialize};

use crate::firestore::datastore::WriteOperation;
use crate::firestore::error::{invalid_input, resource_exhausted, FirestoreResult};
use crate::firestore::model::DocumentKey;
use crate::firestore::value::MapValue;

/// One descriptor of a batched write.
///
/// `document_id` may be omitted on adds, in which case an id is generated.
/// Updates and deletes must name their document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOperation {
    pub collection: String,
    #[serde(default, alias = "documentId")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub data: Option<MapValue>,
}

impl BatchOperation {
    pub fn new(
        collection: impl Into<String>,
        document_id: Option<String>,
        data: Option<MapValue>,
    ) -> Self {
        Self {
            collection: collection.into(),
            document_id,
            data,
        }
    }
}

/// Adds, updates and deletes committed together by
/// [`Firestore::batch_write`](crate::firestore::Firestore::batch_write).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOperationSet {
    pub add: Vec<BatchOperation>,
    pub update: Vec<BatchOperation>,
    pub delete: Vec<BatchOperation>,
}

impl BatchOperationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a document with a generated id.
    pub fn add(mut self, collection: impl Into<String>, data: MapValue) -> Self {
        self.add.push(BatchOperation::new(collection, None, Some(data)));
        self
    }

    pub fn add_with_id(
        mut self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        data: MapValue,
    ) -> Self {
        self.add.push(BatchOperation::new(
            collection,
            Some(document_id.into()),
            Some(data),
        ));
        self
    }

    pub fn update(
        mut self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        data: MapValue,
    ) -> Self {
        self.update.push(BatchOperation::new(
            collection,
            Some(document_id.into()),
            Some(data),
        ));
        self
    }

    pub fn delete(mut self, collection: impl Into<String>, document_id: impl Into<String>) -> Self {
        self.delete
            .push(BatchOperation::new(collection, Some(document_id.into()), None));
        self
    }

    pub fn len(&self) -> usize {
        self.add.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_json(value: &serde_json::Value) -> FirestoreResult<Self> {
        BatchOperationSet::deserialize(value)
            .map_err(|err| invalid_input(format!("Malformed batch: {err}")))
    }

    /// Validates every descriptor and lowers the set to store writes, adds
    /// first, then updates, then deletes. Nothing is returned unless every
    /// descriptor is valid.
    pub fn into_writes(self, max_writes: usize) -> FirestoreResult<Vec<WriteOperation>> {
        let total = self.len();
        if total > max_writes {
            return Err(resource_exhausted(format!(
                "A batch may contain at most {max_writes} operations, got {total}"
            ))
            .raised_locally());
        }

        let mut writes = Vec::with_capacity(total);
        for operation in self.add {
            let key = match operation.document_id.as_deref() {
                Some(id) => DocumentKey::new(&operation.collection, id)?,
                None => DocumentKey::with_auto_id(&operation.collection)?,
            };
            let data = operation.data.ok_or_else(|| {
                invalid_input(format!(
                    "Batch add in '{}' is missing its data",
                    operation.collection
                ))
            })?;
            writes.push(WriteOperation::Set { key, data });
        }
        for operation in self.update {
            let key = required_key(&operation, "update")?;
            let data = operation.data.ok_or_else(|| {
                invalid_input(format!("Batch update of {key} is missing its data"))
            })?;
            writes.push(WriteOperation::Update { key, data });
        }
        for operation in self.delete {
            let key = required_key(&operation, "delete")?;
            writes.push(WriteOperation::Delete { key });
        }
        Ok(writes)
    }
}

fn required_key(operation: &BatchOperation, kind: &str) -> FirestoreResult<DocumentKey> {
    let id = operation.document_id.as_deref().ok_or_else(|| {
        invalid_input(format!(
            "Batch {kind} in '{}' requires a document id",
            operation.collection
        ))
    })?;
    DocumentKey::new(&operation.collection, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::value::FirestoreValue;
    use serde_json::json;

    fn data(value: i64) -> MapValue {
        [("value", FirestoreValue::from_integer(value))]
            .into_iter()
            .collect()
    }

    #[test]
    fn adds_without_id_get_generated_ids() {
        let writes = BatchOperationSet::new()
            .add("items", data(1))
            .add("items", data(2))
            .into_writes(500)
            .unwrap();

        let ids: Vec<&str> = writes.iter().map(|write| write.key().id()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(ids.iter().all(|id| id.len() == 20));
    }

    #[test]
    fn writes_are_ordered_add_update_delete() {
        let writes = BatchOperationSet::new()
            .delete("items", "c")
            .update("items", "b", data(2))
            .add_with_id("items", "a", data(1))
            .into_writes(500)
            .unwrap();

        assert!(matches!(writes[0], WriteOperation::Set { .. }));
        assert!(matches!(writes[1], WriteOperation::Update { .. }));
        assert!(matches!(writes[2], WriteOperation::Delete { .. }));
    }

    #[test]
    fn update_without_id_is_rejected() {
        let set = BatchOperationSet {
            update: vec![BatchOperation::new("items", None, Some(data(1)))],
            ..Default::default()
        };
        let err = set.into_writes(500).unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn add_without_data_is_rejected() {
        let set = BatchOperationSet::from_json(&json!({
            "add": [{"collection": "items", "documentId": "x"}]
        }))
        .unwrap();
        let err = set.into_writes(500).unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
        assert!(err.is_input_error());
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let set = BatchOperationSet::new()
            .delete("items", "a")
            .delete("items", "b")
            .delete("items", "c");
        let err = set.into_writes(2).unwrap_err();
        assert_eq!(err.code_str(), "firestore/resource-exhausted");
        assert!(err.is_input_error());
    }

    #[test]
    fn deserializes_host_payload() {
        let set = BatchOperationSet::from_json(&json!({
            "add": [{"collection": "items", "data": {"value": 1}}],
            "delete": [{"collection": "items", "documentId": "old"}]
        }))
        .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.update.is_empty());
        assert_eq!(set.delete[0].document_id.as_deref(), Some("old"));
    }
}
