use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    serve, Json, Router,
};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::Catalog;
use crate::errors::AppError;
use catalog_types::domain::listing::{OrderListOptions, ProductListOptions};
use catalog_types::domain::order::{Order, OrderDraft, OrderPatch, PopulatedOrder};
use catalog_types::domain::product::{DeleteAck, Product, ProductDraft, ProductPatch};
use catalog_types::domain::validation::ValidationError;
use catalog_types::ports::document_store::DocumentStore;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
    pub index_file: Option<PathBuf>,
}

pub struct HttpServer<S>
where
    S: DocumentStore,
{
    pub catalog: Arc<Catalog<S>>,
    pub config: HttpServerConfig,
}

type AppState<S> = State<Arc<Catalog<S>>>;

impl<S> HttpServer<S>
where
    S: DocumentStore,
{
    pub async fn new(catalog: Catalog<S>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            catalog: Arc::new(catalog),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let mut app = Router::new()
            .route("/health", get(health))
            .route(
                "/products",
                get(list_products::<S>).post(create_product::<S>),
            )
            .route(
                "/products/{id}",
                get(get_product::<S>)
                    .put(edit_product::<S>)
                    .delete(delete_product::<S>),
            )
            .route("/orders", get(list_orders::<S>).post(create_order::<S>))
            .route(
                "/orders/{id}",
                get(get_order::<S>)
                    .put(edit_order::<S>)
                    .delete(delete_order::<S>),
            );
        if let Some(index) = &self.config.index_file {
            app = app.route_service("/", ServeFile::new(index));
        }

        app.layer(trace_layer).with_state(self.catalog.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

fn change_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::new("change must be a JSON object").into()),
    }
}

async fn list_products<S: DocumentStore>(
    State(catalog): AppState<S>,
    Query(options): Query<ProductListOptions>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(catalog.products.list(&options).await?))
}

async fn get_product<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    catalog
        .products
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

async fn create_product<S: DocumentStore>(
    State(catalog): AppState<S>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let draft = ProductDraft::from_json(body)?;
    let product = catalog.products.create(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn edit_product<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Product>, AppError> {
    let patches = ProductPatch::parse_change(&change_object(body)?)?;
    Ok(Json(catalog.products.update(&id, patches).await?))
}

async fn delete_product<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, AppError> {
    Ok(Json(catalog.products.remove(&id).await?))
}

async fn list_orders<S: DocumentStore>(
    State(catalog): AppState<S>,
    Query(options): Query<OrderListOptions>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(catalog.orders.list(&options).await?))
}

async fn get_order<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
) -> Result<Json<PopulatedOrder>, AppError> {
    catalog
        .orders
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".into()))
}

async fn create_order<S: DocumentStore>(
    State(catalog): AppState<S>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<PopulatedOrder>), AppError> {
    let draft = OrderDraft::from_json(body)?;
    let order = catalog.checkout.place_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn edit_order<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<PopulatedOrder>, AppError> {
    let patches = OrderPatch::parse_change(&change_object(body)?)?;
    Ok(Json(catalog.checkout.revise_order(&id, patches).await?))
}

async fn delete_order<S: DocumentStore>(
    State(catalog): AppState<S>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    catalog.orders.destroy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
