use catalog_hex::application::Catalog;
use catalog_hex::errors::AppError;
use catalog_store::memory::InMemoryStore;
use catalog_types::domain::listing::{OrderListOptions, ProductListOptions};
use catalog_types::domain::order::{OrderDraft, OrderPatch, OrderStatus, EMPTY_ORDER};
use catalog_types::domain::product::{ProductDraft, ProductPatch};
use serde_json::{json, Value};

fn product_body(likes: f64, tags: &[&str]) -> Value {
    let tags: Vec<_> = tags.iter().map(|t| json!({ "title": t })).collect();
    json!({
        "description": "A photo",
        "alt_description": "alt",
        "likes": likes,
        "urls": { "regular": "https://img/r", "small": "https://img/s", "thumb": "https://img/t" },
        "links": { "self": "https://api/p", "html": "https://web/p" },
        "user": {
            "id": "u1",
            "first_name": "Grace",
            "last_name": "Hopper",
            "portfolio_url": "https://grace.example",
            "username": "grace"
        },
        "tags": tags
    })
}

fn product(likes: f64, tags: &[&str]) -> ProductDraft {
    ProductDraft::from_json(product_body(likes, tags)).unwrap()
}

fn order(products: Vec<String>) -> OrderDraft {
    OrderDraft::from_json(json!({ "buyerEmail": "buyer@example.com", "products": products }))
        .unwrap()
}

// End-to-end flows against the in-memory store.
#[tokio::test]
async fn created_product_reads_back_equal_to_input() {
    let catalog = Catalog::new(InMemoryStore::new());
    let created = catalog.products.create(product(9.0, &["sea"])).await.unwrap();
    let fetched = catalog.products.get(&created.id).await.unwrap().unwrap();

    let mut expected = product_body(9.0, &["sea"]);
    expected["id"] = json!(created.id);
    assert_eq!(serde_json::to_value(&fetched).unwrap(), expected);
}

#[tokio::test]
async fn listing_pages_and_tag_filter() {
    let catalog = Catalog::new(InMemoryStore::new());
    let mut ids = Vec::new();
    for i in 0..7 {
        let tags: &[&str] = if i < 3 { &["sea", "blue"] } else { &["city"] };
        ids.push(catalog.products.create(product(i as f64, tags)).await.unwrap().id);
    }

    let first = catalog
        .products
        .list(&ProductListOptions {
            offset: 0,
            limit: 4,
            tag: None,
        })
        .await
        .unwrap();
    let second = catalog
        .products
        .list(&ProductListOptions {
            offset: 4,
            limit: 4,
            tag: None,
        })
        .await
        .unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 3);
    let seen: Vec<_> = first.iter().chain(&second).map(|p| p.id.clone()).collect();
    assert_eq!(seen, ids);

    let sea = catalog
        .products
        .list(&ProductListOptions {
            tag: Some("sea".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let sea_ids: Vec<_> = sea.iter().map(|p| p.id.clone()).collect();
    assert_eq!(sea_ids, ids[..3]);

    let sea_page = catalog
        .products
        .list(&ProductListOptions {
            offset: 1,
            limit: 1,
            tag: Some("sea".into()),
        })
        .await
        .unwrap();
    assert_eq!(sea_page[0].id, ids[1]);
}

#[tokio::test]
async fn partial_update_and_idempotent_remove() {
    let catalog = Catalog::new(InMemoryStore::new());
    let created = catalog.products.create(product(1.0, &["a"])).await.unwrap();

    let change = json!({ "likes": 5 });
    let patches = ProductPatch::parse_change(change.as_object().unwrap()).unwrap();
    let updated = catalog.products.update(&created.id, patches).await.unwrap();
    assert_eq!(updated.likes, 5.0);
    assert_eq!(updated.urls, created.urls);
    assert_eq!(updated.user, created.user);
    assert_eq!(updated.tags, created.tags);

    let first = catalog.products.remove(&created.id).await.unwrap();
    let second = catalog.products.remove(&created.id).await.unwrap();
    assert_eq!(first.deleted_count, 1);
    assert_eq!(second.deleted_count, 0);
}

#[tokio::test]
async fn order_lifecycle_with_pricing_and_dangling_reference() {
    let catalog = Catalog::new(InMemoryStore::new());
    let a = catalog.products.create(product(10.0, &[])).await.unwrap();
    let b = catalog.products.create(product(7.0, &[])).await.unwrap();

    let placed = catalog
        .checkout
        .place_order(order(vec![a.id.clone(), b.id.clone()]))
        .await
        .unwrap();
    assert_eq!(placed.total_price, 17.0);
    assert_eq!(placed.products, vec![a.clone(), b.clone()]);

    catalog.products.remove(&a.id).await.unwrap();
    let fetched = catalog.orders.get(&placed.id).await.unwrap().unwrap();
    assert_eq!(fetched.products, vec![b.clone()]);
    assert_eq!(fetched.total_price, 17.0);

    let edited = catalog
        .checkout
        .revise_order(&placed.id, vec![OrderPatch::Status(OrderStatus::Completed)])
        .await
        .unwrap();
    assert_eq!(edited.status, OrderStatus::Completed);

    catalog.orders.destroy(&placed.id).await.unwrap();
    catalog.orders.destroy(&placed.id).await.unwrap();
    assert!(catalog.orders.get(&placed.id).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let catalog = Catalog::new(InMemoryStore::new());
    let res = catalog.checkout.place_order(order(Vec::new())).await;
    match res {
        Err(AppError::Validation(e)) => assert_eq!(e.message, EMPTY_ORDER),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn editing_unknown_order_changes_nothing() {
    let catalog = Catalog::new(InMemoryStore::new());
    let a = catalog.products.create(product(1.0, &[])).await.unwrap();
    let placed = catalog
        .checkout
        .place_order(order(vec![a.id.clone()]))
        .await
        .unwrap();
    let before = catalog.orders.list(&OrderListOptions::default()).await.unwrap();

    let res = catalog
        .orders
        .edit("missing", vec![OrderPatch::Status(OrderStatus::Pending)])
        .await;
    assert!(matches!(res, Err(AppError::NotFound(_))));

    let after = catalog.orders.list(&OrderListOptions::default()).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(after[0].id, placed.id);
}

#[tokio::test]
async fn orders_filtered_by_product_id() {
    let catalog = Catalog::new(InMemoryStore::new());
    let p = catalog.products.create(product(5.0, &[])).await.unwrap();
    let other = catalog.products.create(product(2.0, &[])).await.unwrap();

    let mine = catalog
        .checkout
        .place_order(order(vec![p.id.clone()]))
        .await
        .unwrap();
    catalog
        .checkout
        .place_order(order(vec![other.id.clone()]))
        .await
        .unwrap();

    let found = catalog
        .orders
        .list(&OrderListOptions {
            product_id: Some(p.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, mine.id);
    assert_eq!(found[0].total_price, 5.0);
}
