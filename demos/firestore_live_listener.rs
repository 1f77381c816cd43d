use std::time::Duration;

use futures::StreamExt;
use kfirebase_firestore::firestore::*;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let firestore = Firestore::in_memory();

    firestore.start_listener("messages", "inbox", |result| match result.error() {
        Some(err) => eprintln!("inbox listener failed: {err}"),
        None => println!("inbox now holds {}", result.data_json()),
    })?;

    let unread = QuerySpec::new("messages").with_filter(Filter::new("read", FilterOperator::Equal, false));
    let mut stream = firestore.listen_stream(&unread, "unread")?;

    firestore
        .add_document("messages", "m1", document_from_json(&json!({"text": "hi", "read": false}))?)
        .await?;
    firestore
        .update_document("messages", "m1", document_from_json(&json!({"read": true}))?)
        .await?;

    firestore.stop_listener("unread");
    while let Ok(Some(result)) = tokio::time::timeout(Duration::from_millis(50), stream.next()).await {
        let count = result.data().map_or(0, <[DocumentSnapshot]>::len);
        println!("unread messages: {count}");
    }

    println!("stopped {} remaining listener(s)", firestore.stop_all_listeners());
    Ok(())
}
