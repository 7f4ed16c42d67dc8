use catalog_types::domain::order::{OrderDraft, OrderPatch, PopulatedOrder, EMPTY_ORDER};
use catalog_types::domain::validation::ValidationError;
use catalog_types::ports::document_store::DocumentStore;
use tracing::instrument;

use super::order_repository::OrderRepository;
use super::product_repository::ProductRepository;
use crate::errors::AppError;

/// Prices orders from their referenced products before they are written.
///
/// `likes` stands in for a unit price; this is a placeholder, not a pricing engine.
pub struct Checkout<S: DocumentStore> {
    products: ProductRepository<S>,
    orders: OrderRepository<S>,
}

impl<S: DocumentStore> Checkout<S> {
    pub fn new(products: ProductRepository<S>, orders: OrderRepository<S>) -> Self {
        Self { products, orders }
    }

    /// Sum of `likes` over the referenced products, fetched one at a time.
    /// Unknown ids contribute nothing.
    #[instrument(skip(self))]
    pub async fn price(&self, product_ids: &[String]) -> Result<f64, AppError> {
        let mut total = 0.0;
        for id in product_ids {
            match self.products.get(id).await? {
                Some(product) => total += product.likes,
                None => tracing::debug!(product_id = %id, "unknown product priced at zero"),
            }
        }
        Ok(total)
    }

    /// Prices the draft and creates the order. Nothing is written if pricing fails.
    #[instrument(skip(self, draft))]
    pub async fn place_order(&self, mut draft: OrderDraft) -> Result<PopulatedOrder, AppError> {
        if !draft.has_products() {
            return Err(ValidationError::with_fields(EMPTY_ORDER, vec!["products".into()]).into());
        }
        let product_ids = draft.products.as_deref().unwrap_or_default();
        draft.total_price = Some(self.price(product_ids).await?);
        self.orders.create(draft).await
    }

    /// Edits an order, re-pricing it when the product list is replaced.
    #[instrument(skip(self, patches))]
    pub async fn revise_order(
        &self,
        id: &str,
        mut patches: Vec<OrderPatch>,
    ) -> Result<PopulatedOrder, AppError> {
        if let Some(product_ids) = OrderPatch::replaced_products(&patches) {
            let total = self.price(product_ids).await?;
            patches.push(OrderPatch::TotalPrice(total));
        }
        self.orders.edit(id, patches).await
    }
}
