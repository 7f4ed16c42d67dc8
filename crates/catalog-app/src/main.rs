use catalog_hex::application::Catalog;
use catalog_hex::config::Config;
use catalog_hex::inbound::http::{HttpServer, HttpServerConfig};
use catalog_store::{build_store, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / INDEX_FILE when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let store: Store = build_store(config.database_url.as_deref()).await?;
    tracing::info!(backend = store.backend(), "document store ready");
    let catalog = Catalog::new(store);

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
        index_file: config.index_file.clone(),
    };

    let http = HttpServer::new(catalog, server_cfg).await?;
    http.run().await
}
