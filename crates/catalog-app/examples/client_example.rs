///  To run :
///  cargo r --example client_example
use catalog_client::CatalogClient;
use catalog_hex::application::Catalog;
use catalog_hex::inbound::http::{HttpServer, HttpServerConfig};
use catalog_store::build_store;
use catalog_types::domain::listing::OrderListOptions;
use catalog_types::domain::order::{OrderDraft, OrderStatus};
use catalog_types::domain::product::ProductDraft;
use serde_json::json;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn photo(likes: u32, tag: &str) -> anyhow::Result<ProductDraft> {
    Ok(ProductDraft::from_json(json!({
        "description": format!("A {tag} photo"),
        "likes": likes,
        "urls": { "regular": "r.jpg", "small": "s.jpg", "thumb": "t.jpg" },
        "links": { "self": "https://api/photo", "html": "https://site/photo" },
        "user": { "id": "u1", "first_name": "Example", "username": "example" },
        "tags": [{ "title": tag }]
    }))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Temp file-backed SQLite DB.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("catalog.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let store = build_store(Some(&db_url)).await?;
    let server = HttpServer::new(
        Catalog::new(store),
        HttpServerConfig {
            port: port.to_string(),
            index_file: None,
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = CatalogClient::new(&addr)?;
    let bike = client.create_product(&photo(10, "bike")?).await?;
    let lake = client.create_product(&photo(7, "lake")?).await?;
    println!("Created products {} and {}", bike.id, lake.id);

    let order = client
        .create_order(&OrderDraft {
            buyer_email: Some("example@example.com".into()),
            products: Some(vec![bike.id.clone(), lake.id.clone()]),
            ..Default::default()
        })
        .await?;
    println!("Placed order id={} total={}", order.id, order.total_price);
    assert_eq!(order.total_price, 17.0);

    let edited = client
        .edit_order(&order.id, &json!({ "status": "COMPLETED", "products": [lake.id] }))
        .await?;
    println!("Edited order status={:?} total={}", edited.status, edited.total_price);
    assert_eq!(edited.status, OrderStatus::Completed);

    let with_lake = client
        .list_orders(&OrderListOptions {
            product_id: Some(lake.id.clone()),
            ..Default::default()
        })
        .await?;
    println!("Orders containing {}: {}", lake.id, with_lake.len());

    let ack = client.delete_product(&bike.id).await?;
    println!("Deleted product, deletedCount={}", ack.deleted_count);

    client.delete_order(&order.id).await?;
    assert!(client.get_order(&order.id).await?.is_none());
    println!("Deleted order");

    handle.abort();
    Ok(())
}
