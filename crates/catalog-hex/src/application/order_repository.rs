use std::sync::Arc;

use catalog_types::domain::listing::OrderListOptions;
use catalog_types::domain::order::{Order, OrderDraft, OrderPatch, PopulatedOrder, COLLECTION};
use catalog_types::domain::product::{self, Product};
use catalog_types::ports::document_store::DocumentStore;
use tracing::instrument;

use super::query::{from_document, from_documents, id_page, order_query, to_document};
use crate::errors::AppError;

/// What to do when an order references a product that no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingRefPolicy {
    /// Leave the dangling slot out of the resolved order.
    #[default]
    Skip,
    /// Fail the read with `NotFound`.
    Fail,
}

pub struct OrderRepository<S: DocumentStore> {
    store: Arc<S>,
    missing_refs: MissingRefPolicy,
}

impl<S: DocumentStore> Clone for OrderRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            missing_refs: self.missing_refs,
        }
    }
}

impl<S: DocumentStore> OrderRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            missing_refs: MissingRefPolicy::default(),
        }
    }

    pub fn with_missing_refs(mut self, policy: MissingRefPolicy) -> Self {
        self.missing_refs = policy;
        self
    }

    /// Persists an already-priced order and returns it with products resolved.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: OrderDraft) -> Result<PopulatedOrder, AppError> {
        let order = draft.validate()?;
        self.store.insert(COLLECTION, to_document(&order)?).await?;
        tracing::info!(order_id = %order.id, total_price = order.total_price, "order created");
        self.resolve(order).await
    }

    /// Stored orders, product ids unresolved.
    #[instrument(skip(self))]
    pub async fn list(&self, options: &OrderListOptions) -> Result<Vec<Order>, AppError> {
        let docs = self
            .store
            .find(
                COLLECTION,
                &order_query(options),
                &id_page(options.offset, options.limit),
            )
            .await?;
        tracing::debug!(count = docs.len(), "orders listed");
        Ok(from_documents(docs)?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<PopulatedOrder>, AppError> {
        match self.load(id).await? {
            Some(order) => Ok(Some(self.resolve(order).await?)),
            None => Ok(None),
        }
    }

    /// Read-modify-write with no version check; see [`ProductRepository::update`].
    ///
    /// [`ProductRepository::update`]: super::product_repository::ProductRepository::update
    #[instrument(skip(self, patches))]
    pub async fn edit(&self, id: &str, patches: Vec<OrderPatch>) -> Result<PopulatedOrder, AppError> {
        let mut order = self.load(id).await?.ok_or_else(not_found)?;
        order.apply(patches);
        if !self.store.save(COLLECTION, to_document(&order)?).await? {
            return Err(not_found());
        }
        tracing::info!(order_id = %id, "order edited");
        self.resolve(order).await
    }

    /// Hard delete; an unknown id is not an error.
    #[instrument(skip(self))]
    pub async fn destroy(&self, id: &str) -> Result<(), AppError> {
        let deleted = self.store.delete_one(COLLECTION, id).await?;
        tracing::info!(order_id = %id, deleted, "order destroyed");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<Order>, AppError> {
        let doc = self.store.find_by_id(COLLECTION, id).await?;
        Ok(doc.map(from_document).transpose()?)
    }

    /// Join step: looks up each referenced product in slot order.
    async fn resolve(&self, order: Order) -> Result<PopulatedOrder, AppError> {
        let mut products = Vec::with_capacity(order.products.len());
        for product_id in &order.products {
            match self.store.find_by_id(product::COLLECTION, product_id).await? {
                Some(doc) => products.push(from_document::<Product>(doc)?),
                None => match self.missing_refs {
                    MissingRefPolicy::Skip => {
                        tracing::warn!(order_id = %order.id, %product_id, "dangling product reference skipped");
                    }
                    MissingRefPolicy::Fail => {
                        return Err(AppError::NotFound(format!(
                            "Product {product_id} referenced by order {} not found",
                            order.id
                        )));
                    }
                },
            }
        }
        Ok(order.populate(products))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}
