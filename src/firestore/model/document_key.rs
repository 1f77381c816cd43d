use std::fmt::{Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::firestore::constants::AUTO_ID_LENGTH;
use crate::firestore::error::{invalid_input, FirestoreResult};
use crate::firestore::model::ResourcePath;

/// Identifies one document: its collection path plus document id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey {
    path: ResourcePath,
}

impl DocumentKey {
    pub fn from_path(path: ResourcePath) -> FirestoreResult<Self> {
        if path.len() < 2 || path.len() % 2 != 0 {
            return Err(invalid_input(
                "Document keys must point to a document (even number of segments)",
            ));
        }
        Ok(Self { path })
    }

    pub fn from_string(path: &str) -> FirestoreResult<Self> {
        let resource = ResourcePath::from_string(path)?;
        Self::from_path(resource)
    }

    /// Builds the key for `document_id` inside `collection`.
    pub fn new(collection: &str, document_id: &str) -> FirestoreResult<Self> {
        let collection = ResourcePath::collection(collection)?;
        validate_document_id(document_id)?;
        Ok(Self {
            path: collection.child(document_id),
        })
    }

    /// Builds a key with a freshly generated id inside `collection`.
    pub fn with_auto_id(collection: &str) -> FirestoreResult<Self> {
        Self::new(collection, &generate_auto_id())
    }

    pub fn collection_path(&self) -> ResourcePath {
        self.path.without_last()
    }

    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.last_segment().unwrap_or_default()
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

fn validate_document_id(document_id: &str) -> FirestoreResult<()> {
    if document_id.trim().is_empty() {
        return Err(invalid_input("Document ID cannot be empty."));
    }
    if document_id.contains('/') {
        return Err(invalid_input("Document ID cannot contain '/'."));
    }
    Ok(())
}

pub fn generate_auto_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(AUTO_ID_LENGTH)
        .collect()
}
