//! Callback flavours of the [`Firestore`] operations for hosts without an
//! async runtime of their own.
//!
//! Each call runs on a detached task and hands its result to the callback
//! exactly once.

use crate::firestore::value::MapValue;
use crate::platform::runtime::spawn_detached;

use super::batch::BatchOperationSet;
use super::database::Firestore;
use super::query::QuerySpec;
use super::result::{DocumentResult, ListResult, UnitResult};

impl Firestore {
    pub fn add_document_with_callback<F>(
        &self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        data: MapValue,
        callback: F,
    ) where
        F: FnOnce(UnitResult) + Send + 'static,
    {
        let firestore = self.clone();
        let (collection, document_id) = (collection.into(), document_id.into());
        spawn_detached(async move {
            let result = firestore
                .add_document(&collection, &document_id, data)
                .await;
            callback(UnitResult::from(result));
        });
    }

    pub fn get_document_with_callback<F>(
        &self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        callback: F,
    ) where
        F: FnOnce(DocumentResult) + Send + 'static,
    {
        let firestore = self.clone();
        let (collection, document_id) = (collection.into(), document_id.into());
        spawn_detached(async move {
            let result = firestore.get_document(&collection, &document_id).await;
            callback(DocumentResult::from(result));
        });
    }

    pub fn get_all_documents_with_callback<F>(&self, collection: impl Into<String>, callback: F)
    where
        F: FnOnce(ListResult) + Send + 'static,
    {
        let firestore = self.clone();
        let collection = collection.into();
        spawn_detached(async move {
            let result = firestore.get_all_documents(&collection).await;
            callback(ListResult::from(result));
        });
    }

    pub fn update_document_with_callback<F>(
        &self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        data: MapValue,
        callback: F,
    ) where
        F: FnOnce(UnitResult) + Send + 'static,
    {
        let firestore = self.clone();
        let (collection, document_id) = (collection.into(), document_id.into());
        spawn_detached(async move {
            let result = firestore
                .update_document(&collection, &document_id, data)
                .await;
            callback(UnitResult::from(result));
        });
    }

    pub fn delete_document_with_callback<F>(
        &self,
        collection: impl Into<String>,
        document_id: impl Into<String>,
        callback: F,
    ) where
        F: FnOnce(UnitResult) + Send + 'static,
    {
        let firestore = self.clone();
        let (collection, document_id) = (collection.into(), document_id.into());
        spawn_detached(async move {
            let result = firestore.delete_document(&collection, &document_id).await;
            callback(UnitResult::from(result));
        });
    }

    pub fn execute_query_with_callback<F>(&self, spec: QuerySpec, callback: F)
    where
        F: FnOnce(ListResult) + Send + 'static,
    {
        let firestore = self.clone();
        spawn_detached(async move {
            let result = firestore.execute_query(&spec).await;
            callback(ListResult::from(result));
        });
    }

    pub fn batch_write_with_callback<F>(&self, batch: BatchOperationSet, callback: F)
    where
        F: FnOnce(UnitResult) + Send + 'static,
    {
        let firestore = self.clone();
        spawn_detached(async move {
            let result = firestore.batch_write(batch).await;
            callback(UnitResult::from(result));
        });
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::firestore::value::FirestoreValue;
    use futures::channel::oneshot;

    #[tokio::test(flavor = "multi_thread")]
    async fn callbacks_deliver_once_with_uniform_results() {
        let firestore = Firestore::in_memory();
        let data: MapValue = [("title", FirestoreValue::from_string("hello"))]
            .into_iter()
            .collect();

        let (tx, rx) = oneshot::channel();
        firestore.add_document_with_callback("notes", "n1", data, move |result| {
            let _ = tx.send(result);
        });
        assert!(rx.await.unwrap().is_ok());

        let (tx, rx) = oneshot::channel();
        firestore.get_document_with_callback("notes", "n1", move |result| {
            let _ = tx.send(result);
        });
        let result = rx.await.unwrap();
        assert_eq!(result.data_json(), serde_json::json!({"title": "hello"}));

        let (tx, rx) = oneshot::channel();
        firestore.get_document_with_callback("notes", "missing", move |result| {
            let _ = tx.send(result);
        });
        assert!(rx.await.unwrap().is_missing());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn callback_reports_input_errors() {
        let firestore = Firestore::in_memory();
        let (tx, rx) = oneshot::channel();
        firestore.delete_document_with_callback("notes", "", move |result| {
            let _ = tx.send(result);
        });
        let result = rx.await.unwrap();
        assert_eq!(
            result.error().map(|err| err.code_str()),
            Some("firestore/invalid-argument")
        );
    }
}
