use std::time::Duration;

use anyhow::Context;
use catalog_types::domain::listing::{OrderListOptions, ProductListOptions};
use catalog_types::domain::order::{Order, OrderDraft, PopulatedOrder};
use catalog_types::domain::product::{DeleteAck, Product, ProductDraft};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone)]
pub struct CatalogClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Typed client for the catalog HTTP API.
#[derive(Clone)]
pub struct CatalogClient {
    base: Url,
    client: reqwest::Client,
}

/// Error body returned by the server on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    fields: Vec<String>,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<CatalogClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(CatalogClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    /// `{collection}/{id}` with `id` percent-encoded as a single segment.
    fn item_url(&self, collection: &str, id: &str) -> anyhow::Result<Url> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base url cannot carry a path"))?
            .push(id);
        Ok(url)
    }

    pub async fn list_products(&self, options: &ProductListOptions) -> anyhow::Result<Vec<Product>> {
        let res = self
            .client
            .get(self.url("products")?)
            .query(options)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    /// `None` when the server answers 404.
    pub async fn get_product(&self, id: &str) -> anyhow::Result<Option<Product>> {
        let res = self
            .client
            .get(self.item_url("products", id)?)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(checked(res).await?.json().await?))
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> anyhow::Result<Product> {
        let res = self
            .client
            .post(self.url("products")?)
            .json(draft)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    /// Sends a partial change object, e.g. `{"likes": 5}`.
    pub async fn update_product(&self, id: &str, change: &Value) -> anyhow::Result<Product> {
        let res = self
            .client
            .put(self.item_url("products", id)?)
            .json(change)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    pub async fn delete_product(&self, id: &str) -> anyhow::Result<DeleteAck> {
        let res = self
            .client
            .delete(self.item_url("products", id)?)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    pub async fn list_orders(&self, options: &OrderListOptions) -> anyhow::Result<Vec<Order>> {
        let res = self
            .client
            .get(self.url("orders")?)
            .query(options)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    pub async fn get_order(&self, id: &str) -> anyhow::Result<Option<PopulatedOrder>> {
        let res = self
            .client
            .get(self.item_url("orders", id)?)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(checked(res).await?.json().await?))
    }

    /// The server prices the order; any `total_price` in the draft is ignored.
    pub async fn create_order(&self, draft: &OrderDraft) -> anyhow::Result<PopulatedOrder> {
        let res = self
            .client
            .post(self.url("orders")?)
            .json(draft)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    pub async fn edit_order(&self, id: &str, change: &Value) -> anyhow::Result<PopulatedOrder> {
        let res = self
            .client
            .put(self.item_url("orders", id)?)
            .json(change)
            .send()
            .await?;
        Ok(checked(res).await?.json().await?)
    }

    pub async fn delete_order(&self, id: &str) -> anyhow::Result<()> {
        let res = self
            .client
            .delete(self.item_url("orders", id)?)
            .send()
            .await?;
        checked(res).await?;
        Ok(())
    }
}

async fn checked(res: Response) -> anyhow::Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let url = res.url().clone();
    match res.json::<ErrorBody>().await {
        Ok(body) if body.fields.is_empty() => {
            anyhow::bail!("{status} from {url}: {}", body.error)
        }
        Ok(body) => anyhow::bail!(
            "{status} from {url}: {} [{}]",
            body.error,
            body.fields.join(", ")
        ),
        Err(_) => anyhow::bail!("{status} from {url}"),
    }
}

impl CatalogClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<CatalogClient> {
        if let Some(client) = self.client {
            return Ok(CatalogClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        tracing::debug!(base = %self.base, "catalog client built");
        Ok(CatalogClient {
            base: self.base,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::domain::order::OrderStatus;
    use catalog_types::domain::product::{Links, ProductUser, Tag, Urls};
    use httpmock::prelude::*;
    use serde_json::json;

    fn sample_product() -> Product {
        Product {
            id: "p1".into(),
            description: Some("Bike".into()),
            alt_description: None,
            likes: 10.0,
            urls: Urls {
                regular: "r".into(),
                small: "s".into(),
                thumb: "t".into(),
            },
            links: Links {
                self_link: "self".into(),
                html: "html".into(),
            },
            user: ProductUser {
                id: "u1".into(),
                first_name: "Ada".into(),
                last_name: None,
                portfolio_url: None,
                username: "ada".into(),
            },
            tags: vec![Tag {
                title: "bike".into(),
            }],
        }
    }

    fn sample_order(product: &Product) -> PopulatedOrder {
        PopulatedOrder {
            id: "o1".into(),
            buyer_email: "buyer@example.com".into(),
            products: vec![product.clone()],
            status: OrderStatus::Created,
            total_price: product.likes,
        }
    }

    #[tokio::test]
    async fn product_calls() {
        let server = MockServer::start();
        let product = sample_product();

        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("tag", "bike")
                .query_param("limit", "5");
            then.status(200).json_body_obj(&vec![product.clone()]);
        });
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/products");
            then.status(201).json_body_obj(&product);
        });
        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PUT)
                .path("/products/p1")
                .json_body(json!({ "likes": 5 }));
            let mut updated = product.clone();
            updated.likes = 5.0;
            then.status(200).json_body_obj(&updated);
        });
        let delete_mock = server.mock(|when, then| {
            when.method(DELETE).path("/products/p1");
            then.status(200)
                .json_body(json!({ "acknowledged": true, "deletedCount": 1 }));
        });
        let missing_mock = server.mock(|when, then| {
            when.method(GET).path("/products/gone");
            then.status(404).json_body(json!({ "error": "Product not found" }));
        });

        let client = CatalogClient::new(&server.base_url()).unwrap();
        let listed = client
            .list_products(&ProductListOptions {
                limit: 5,
                tag: Some("bike".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed, vec![product.clone()]);

        let draft = ProductDraft::from_json(serde_json::to_value(&product).unwrap()).unwrap();
        let created = client.create_product(&draft).await.unwrap();
        assert_eq!(created, product);

        let updated = client
            .update_product("p1", &json!({ "likes": 5 }))
            .await
            .unwrap();
        assert_eq!(updated.likes, 5.0);

        let ack = client.delete_product("p1").await.unwrap();
        assert_eq!(ack.deleted_count, 1);

        assert!(client.get_product("gone").await.unwrap().is_none());

        list_mock.assert();
        create_mock.assert();
        update_mock.assert();
        delete_mock.assert();
        missing_mock.assert();
    }

    #[tokio::test]
    async fn order_calls() {
        let server = MockServer::start();
        let product = sample_product();
        let order = sample_order(&product);

        let create_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/orders")
                .json_body_partial(r#"{ "buyerEmail": "buyer@example.com", "products": ["p1"] }"#);
            then.status(201).json_body_obj(&order);
        });
        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/orders")
                .query_param("productId", "p1")
                .query_param("status", "CREATED");
            then.status(200).json_body(json!([{
                "id": "o1",
                "buyerEmail": "buyer@example.com",
                "products": ["p1"],
                "status": "CREATED",
                "total_price": 10.0
            }]));
        });
        let edit_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PUT)
                .path("/orders/o1")
                .json_body(json!({ "status": "COMPLETED" }));
            let mut edited = order.clone();
            edited.status = OrderStatus::Completed;
            then.status(200).json_body_obj(&edited);
        });
        let delete_mock = server.mock(|when, then| {
            when.method(DELETE).path("/orders/o1");
            then.status(204);
        });

        let client = CatalogClient::new(&server.base_url()).unwrap();
        let draft = OrderDraft {
            buyer_email: Some("buyer@example.com".into()),
            products: Some(vec!["p1".into()]),
            ..Default::default()
        };
        let created = client.create_order(&draft).await.unwrap();
        assert_eq!(created.total_price, 10.0);

        let listed = client
            .list_orders(&OrderListOptions {
                product_id: Some("p1".into()),
                status: Some(OrderStatus::Created),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed[0].products, vec!["p1"]);

        let edited = client
            .edit_order("o1", &json!({ "status": "COMPLETED" }))
            .await
            .unwrap();
        assert_eq!(edited.status, OrderStatus::Completed);

        client.delete_order("o1").await.unwrap();

        create_mock.assert();
        list_mock.assert();
        edit_mock.assert();
        delete_mock.assert();
    }

    #[test]
    fn ids_are_encoded_as_one_path_segment() {
        let client = CatalogClient::new("http://localhost:8080/").unwrap();
        let url = client.item_url("products", "a/b?c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/products/a%2Fb%3Fc");
        let plain = client.item_url("orders", "o1").unwrap();
        assert_eq!(plain.as_str(), "http://localhost:8080/orders/o1");
    }

    #[tokio::test]
    async fn validation_errors_carry_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/orders");
            then.status(400).json_body(json!({
                "error": "Order must include at least one product",
                "fields": ["products"]
            }));
        });

        let client = CatalogClient::builder(&server.base_url())
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_header("x-request-source", "tests")
            .unwrap()
            .build()
            .unwrap();
        let err = client
            .create_order(&OrderDraft::default())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("400 Bad Request"));
        assert!(err.contains("Order must include at least one product [products]"));
    }
}
