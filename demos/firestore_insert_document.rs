use kfirebase_firestore::firestore::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let firestore = Firestore::in_memory();

    let ada = document_from_json(&serde_json::json!({
        "first": "Ada",
        "last": "Lovelace",
        "born": 1815
    }))?;
    firestore.add_document("users", "ada", ada).await?;
    println!("Document written with ID: ada");

    let batch = BatchOperationSet::new()
        .add(
            "users",
            document_from_json(&serde_json::json!({
                "first": "Alan",
                "middle": "Mathison",
                "last": "Turing",
                "born": 1912
            }))?,
        )
        .update(
            "users",
            "ada",
            document_from_json(&serde_json::json!({"known_for": "Analytical Engine"}))?,
        );
    firestore.batch_write(batch).await?;

    for user in firestore.get_all_documents("users").await? {
        println!("{} => {}", user.id(), user.to_json());
    }
    Ok(())
}
