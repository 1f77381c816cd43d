use std::error::Error;

use kfirebase_firestore::firestore::*;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let firestore = Firestore::in_memory();
    seed_cities(&firestore).await?;

    // The same query a host layer would send as JSON.
    let spec = QuerySpec::from_json(&json!({
        "collection": "cities",
        "filters": [
            {"field": "country", "op": "==", "value": "USA"},
            {"field": "population", "op": ">", "value": 700000}
        ],
        "orderBy": "population",
        "direction": "desc",
        "limit": 3
    }))?;

    let cities = firestore.execute_query(&spec).await?;
    println!("Loaded {} cities from Firestore:", cities.len());
    for city in &cities {
        let name = field_as_string(city, "name").unwrap_or_else(|| "Unknown".into());
        let state = field_as_string(city, "state").unwrap_or_else(|| "Unknown".into());
        let population = city
            .data()
            .get("population")
            .and_then(FirestoreValue::as_i64)
            .unwrap_or_default();
        println!("- {name}, {state}: population {population}");
    }

    let coastal = QuerySpec::new("cities").with_filter(Filter::new(
        "regions",
        FilterOperator::ArrayContainsAny,
        vec!["west_coast", "east_coast"],
    ));
    println!(
        "{} coastal cities",
        firestore.execute_query(&coastal).await?.len()
    );

    Ok(())
}

async fn seed_cities(firestore: &Firestore) -> FirestoreResult<()> {
    let cities = [
        ("SF", json!({"name": "San Francisco", "state": "CA", "country": "USA",
            "capital": false, "population": 860000, "regions": ["west_coast", "norcal"]})),
        ("LA", json!({"name": "Los Angeles", "state": "CA", "country": "USA",
            "capital": false, "population": 3900000, "regions": ["west_coast", "socal"]})),
        ("DC", json!({"name": "Washington, D.C.", "state": null, "country": "USA",
            "capital": true, "population": 680000, "regions": ["east_coast"]})),
        ("TOK", json!({"name": "Tokyo", "state": null, "country": "Japan",
            "capital": true, "population": 9000000, "regions": ["kanto", "honshu"]})),
        ("BJ", json!({"name": "Beijing", "state": null, "country": "China",
            "capital": true, "population": 21500000, "regions": ["jingjinji", "hebei"]})),
    ];

    let mut batch = BatchOperationSet::new();
    for (id, data) in cities {
        batch = batch.add_with_id("cities", id, document_from_json(&data)?);
    }
    firestore.batch_write(batch).await
}

fn field_as_string(snapshot: &DocumentSnapshot, field: &str) -> Option<String> {
    snapshot
        .data()
        .get(field)
        .and_then(FirestoreValue::as_str)
        .map(str::to_owned)
}
