use catalog_types::ports::document_store::{
    DocumentStore, FindOptions, Query, Sort, StoreError,
};
use serde_json::{json, Value};

fn order(id: &str, products: &[&str], status: &str) -> Value {
    json!({ "id": id, "buyerEmail": "a@b.com", "products": products, "status": status, "total_price": 1.0 })
}

fn by_id(skip: u64, limit: Option<u64>) -> FindOptions {
    FindOptions {
        sort: Some(Sort::ascending("id")),
        skip,
        limit,
    }
}

fn ids(docs: &[Value]) -> Vec<&str> {
    docs.iter().map(|d| d["id"].as_str().unwrap()).collect()
}

pub async fn crud_flow<S: DocumentStore>(store: &S) {
    let doc = order("o1", &["p1"], "CREATED");
    let created = store.insert("orders", doc.clone()).await.unwrap();
    assert_eq!(created, doc);

    let dup = store.insert("orders", doc.clone()).await;
    assert!(matches!(dup, Err(StoreError::Duplicate { .. })));

    let fetched = store.find_by_id("orders", "o1").await.unwrap().unwrap();
    assert_eq!(fetched["buyerEmail"], "a@b.com");
    assert!(store.find_by_id("products", "o1").await.unwrap().is_none());

    let mut changed = fetched.clone();
    changed["status"] = json!("PENDING");
    assert!(store.save("orders", changed).await.unwrap());
    let fetched = store.find_by_id("orders", "o1").await.unwrap().unwrap();
    assert_eq!(fetched["status"], "PENDING");

    assert!(!store.save("orders", order("ghost", &["p1"], "CREATED")).await.unwrap());
    assert!(store.find_by_id("orders", "ghost").await.unwrap().is_none());

    assert_eq!(store.delete_one("orders", "o1").await.unwrap(), 1);
    assert_eq!(store.delete_one("orders", "o1").await.unwrap(), 0);
    assert!(store.find_by_id("orders", "o1").await.unwrap().is_none());
}

pub async fn rejects_documents_without_id<S: DocumentStore>(store: &S) {
    let res = store.insert("orders", json!({ "buyerEmail": "a@b.com" })).await;
    assert!(matches!(res, Err(StoreError::Malformed(_))));
}

pub async fn query_flow<S: DocumentStore>(store: &S) {
    // Inserted out of order so sorting is observable.
    for (id, products, status) in [
        ("o3", vec!["p1", "p2"], "PENDING"),
        ("o1", vec!["p1"], "CREATED"),
        ("o4", vec!["p3"], "PENDING"),
        ("o2", vec!["p2"], "CREATED"),
    ] {
        store.insert("orders", order(id, &products, status)).await.unwrap();
    }
    store
        .insert(
            "products",
            json!({ "id": "p1", "likes": 5.0, "tags": [{ "title": "bike" }, { "title": "red" }] }),
        )
        .await
        .unwrap();
    store
        .insert("products", json!({ "id": "p2", "likes": 7, "tags": [{ "title": "Bike" }] }))
        .await
        .unwrap();

    let all = store.find("orders", &Query::all(), &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&all), vec!["o1", "o2", "o3", "o4"]);

    let page = store.find("orders", &Query::all(), &by_id(1, Some(2))).await.unwrap();
    assert_eq!(ids(&page), vec!["o2", "o3"]);

    let past_end = store.find("orders", &Query::all(), &by_id(10, Some(5))).await.unwrap();
    assert!(past_end.is_empty());

    let empty_page = store.find("orders", &Query::all(), &by_id(0, Some(0))).await.unwrap();
    assert!(empty_page.is_empty());

    let desc = FindOptions {
        sort: Some(Sort::descending("id")),
        skip: 0,
        limit: Some(1),
    };
    let last = store.find("orders", &Query::all(), &desc).await.unwrap();
    assert_eq!(ids(&last), vec!["o4"]);

    let pending = Query::all().eq("status", "PENDING");
    let found = store.find("orders", &pending, &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&found), vec!["o3", "o4"]);

    let with_p1 = Query::all().contains("products", "p1");
    let found = store.find("orders", &with_p1, &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&found), vec!["o1", "o3"]);

    let both = Query::all().contains("products", "p2").eq("status", "CREATED");
    let found = store.find("orders", &both, &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&found), vec!["o2"]);

    let tagged = Query::all().elem_match("tags", "title", "bike");
    let found = store.find("products", &tagged, &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&found), vec!["p1"]);

    let liked = Query::all().eq("likes", 7);
    let found = store.find("products", &liked, &by_id(0, None)).await.unwrap();
    assert_eq!(ids(&found), vec!["p2"]);

    let missing = store.find("nothing", &Query::all(), &by_id(0, None)).await.unwrap();
    assert!(missing.is_empty());
}
