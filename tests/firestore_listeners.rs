#![cfg(not(target_arch = "wasm32"))]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use kfirebase_firestore::firestore::*;
use serde_json::json;

type Events = Arc<Mutex<Vec<Result<usize, FirestoreErrorCode>>>>;

fn recorder() -> (Events, impl Fn(ListResult) + Send + Sync + 'static) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let captured = events.clone();
    let callback = move |result: ListResult| {
        let event = match result.error() {
            Some(err) => Err(err.code),
            None => Ok(result.data().map_or(0, <[DocumentSnapshot]>::len)),
        };
        captured.lock().unwrap().push(event);
    };
    (events, callback)
}

fn message(read: bool) -> MapValue {
    document_from_json(&json!({"text": "hello", "read": read})).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn listener_sees_initial_state_and_updates_until_stopped() {
    let firestore = Firestore::in_memory();
    let (events, callback) = recorder();

    firestore.start_listener("messages", "a", callback).unwrap();
    firestore.add_document("messages", "m1", message(false)).await.unwrap();
    assert!(firestore.stop_listener("a"));
    firestore.add_document("messages", "m2", message(false)).await.unwrap();

    assert_eq!(events.lock().unwrap().as_slice(), &[Ok(0), Ok(1)]);
    assert!(!firestore.is_listening("a"));
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_all_leaves_registry_empty() {
    let datastore = Arc::new(InMemoryDatastore::new());
    let firestore = Firestore::new(datastore.clone(), FirestoreSettings::default()).unwrap();
    let (events, callback) = recorder();
    let callback = Arc::new(callback);

    for id in ["a", "b", "c"] {
        let callback = callback.clone();
        firestore
            .start_listener("messages", id, move |result| callback(result))
            .unwrap();
    }
    assert_eq!(firestore.active_listener_ids(), ["a", "b", "c"]);

    assert_eq!(firestore.stop_all_listeners(), 3);
    assert!(firestore.active_listener_ids().is_empty());
    assert_eq!(datastore.listener_count(), 0);

    firestore.add_document("messages", "m1", message(false)).await.unwrap();
    assert_eq!(events.lock().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn stopping_unknown_listener_is_a_noop() {
    let firestore = Firestore::in_memory();
    assert!(!firestore.stop_listener("nobody"));
    assert_eq!(firestore.stop_all_listeners(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_start_replaces_previous_listener_by_default() {
    let datastore = Arc::new(InMemoryDatastore::new());
    let firestore = Firestore::new(datastore.clone(), FirestoreSettings::default()).unwrap();
    let (old_events, old_callback) = recorder();
    let (new_events, new_callback) = recorder();

    firestore.start_listener("messages", "feed", old_callback).unwrap();
    firestore.start_listener("messages", "feed", new_callback).unwrap();
    firestore.add_document("messages", "m1", message(false)).await.unwrap();

    assert_eq!(old_events.lock().unwrap().as_slice(), &[Ok(0)]);
    assert_eq!(new_events.lock().unwrap().as_slice(), &[Ok(0), Ok(1)]);
    assert_eq!(datastore.listener_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reject_policy_is_configurable_from_json() {
    let settings =
        FirestoreSettings::from_json(r#"{"duplicate_listener_policy": "reject"}"#).unwrap();
    let firestore = Firestore::new(Arc::new(InMemoryDatastore::new()), settings).unwrap();

    firestore.start_listener("messages", "feed", |_| {}).unwrap();
    let err = firestore
        .start_listener("messages", "feed", |_| {})
        .unwrap_err();
    assert_eq!(err.code, FirestoreErrorCode::AlreadyExists);
    assert!(firestore.is_listening("feed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn query_listener_tracks_filtered_results() {
    let firestore = Firestore::in_memory();
    let (events, callback) = recorder();
    let unread = QuerySpec::new("messages").with_filter(Filter::new(
        "read",
        FilterOperator::Equal,
        false,
    ));

    firestore.start_query_listener(&unread, "unread", callback).unwrap();
    firestore.add_document("messages", "m1", message(false)).await.unwrap();
    firestore.add_document("messages", "m2", message(false)).await.unwrap();
    firestore
        .update_document("messages", "m1", message(true))
        .await
        .unwrap();
    firestore.delete_document("messages", "m2").await.unwrap();

    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[Ok(0), Ok(1), Ok(2), Ok(1), Ok(0)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn listener_errors_arrive_through_the_callback() {
    let datastore = Arc::new(InMemoryDatastore::new());
    let firestore = Firestore::new(datastore.clone(), FirestoreSettings::default()).unwrap();
    let (events, callback) = recorder();

    firestore.start_listener("messages", "a", callback).unwrap();
    let collection = kfirebase_firestore::firestore::model::ResourcePath::collection("messages")
        .unwrap();
    datastore.fail_listeners(
        &collection,
        FirestoreError::new(FirestoreErrorCode::PermissionDenied, "revoked"),
    );

    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[Ok(0), Err(FirestoreErrorCode::PermissionDenied)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_subscription_is_reported_and_not_registered() {
    let datastore = Arc::new(InMemoryDatastore::new());
    let firestore = Firestore::new(datastore.clone(), FirestoreSettings::default()).unwrap();
    datastore.fail_next(FirestoreError::new(FirestoreErrorCode::Unavailable, "offline"));

    let err = firestore
        .start_listener("messages", "a", |_| {})
        .unwrap_err();
    assert_eq!(err.code, FirestoreErrorCode::Unavailable);
    assert!(!firestore.is_listening("a"));
}

#[tokio::test(flavor = "multi_thread")]
async fn listen_stream_yields_snapshots_and_ends_after_stop() {
    let firestore = Firestore::in_memory();
    let mut stream = firestore
        .listen_stream(&QuerySpec::new("messages"), "stream")
        .unwrap();

    firestore.add_document("messages", "m1", message(false)).await.unwrap();
    assert!(firestore.stop_listener("stream"));

    let mut sizes = Vec::new();
    while let Ok(Some(result)) = tokio::time::timeout(Duration::from_secs(1), stream.next()).await {
        sizes.push(result.data().map_or(0, <[DocumentSnapshot]>::len));
    }
    assert_eq!(sizes, [0, 1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_writers_and_stop_never_deliver_after_stop_returns() {
    let firestore = Firestore::in_memory();
    let delivered = Arc::new(Mutex::new(0usize));
    let counter = delivered.clone();
    firestore
        .start_listener("counters", "busy", move |_| {
            *counter.lock().unwrap() += 1;
        })
        .unwrap();

    let writer = firestore.clone();
    let writes = tokio::spawn(async move {
        for index in 0..50 {
            writer
                .add_document("counters", &format!("c{index}"), MapValue::default())
                .await
                .unwrap();
        }
    });

    tokio::task::yield_now().await;
    firestore.stop_listener("busy");
    let after_stop = *delivered.lock().unwrap();
    writes.await.unwrap();

    // One delivery may already have been past the liveness check.
    assert!(*delivered.lock().unwrap() <= after_stop + 1);
}
